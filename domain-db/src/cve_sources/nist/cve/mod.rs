use chrono::NaiveDateTime;
use serde::Deserialize;

/// One CVE record as served by the NVD CVE API 2.0. The feed schema evolves
/// and most fields are optional in practice, so everything but the identifier
/// is modelled with explicit presence.
#[derive(Debug, Default, Deserialize, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub struct CVE {
    pub id: String,
    #[serde(default)]
    pub published: Option<NaiveDateTime>,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<NaiveDateTime>,
    #[serde(rename = "sourceIdentifier", default)]
    pub source_identifier: Option<String>,
    #[serde(rename = "vulnStatus", default)]
    pub vuln_status: Option<VulnStatus>,
    #[serde(default)]
    pub descriptions: Vec<Description>,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// Analysis state assigned by the upstream authority. The feed has grown new
/// states before; anything unrecognized maps to `Unknown` instead of failing
/// the whole page.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum VulnStatus {
    Analyzed,
    #[serde(rename = "Awaiting Analysis")]
    AwaitingAnalysis,
    Modified,
    Received,
    Rejected,
    #[serde(rename = "Undergoing Analysis")]
    UndergoingAnalysis,
    #[serde(other)]
    Unknown,
}

impl VulnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyzed => "Analyzed",
            Self::AwaitingAnalysis => "Awaiting Analysis",
            Self::Modified => "Modified",
            Self::Received => "Received",
            Self::Rejected => "Rejected",
            Self::UndergoingAnalysis => "Undergoing Analysis",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Description {
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Metric entries grouped by scoring-scheme family, in the feed's own keys.
/// A record may report multiple scorers under the same family.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Metrics {
    #[serde(rename = "cvssMetricV2", default)]
    pub cvss_metric_v2: Vec<MetricEntry>,
    #[serde(rename = "cvssMetricV30", default)]
    pub cvss_metric_v30: Vec<MetricEntry>,
    #[serde(rename = "cvssMetricV31", default)]
    pub cvss_metric_v31: Vec<MetricEntry>,
}

impl Metrics {
    /// All entries in fixed family priority order: legacy v2 first, then the
    /// modern sub-versions.
    pub fn iter_all(&self) -> impl Iterator<Item = &MetricEntry> {
        self.cvss_metric_v2
            .iter()
            .chain(self.cvss_metric_v30.iter())
            .chain(self.cvss_metric_v31.iter())
    }
}

/// A single scorer's assessment. Entry-level fields are where the legacy
/// scheme keeps severity and the insufficient-info flag; modern versions keep
/// everything of interest under `cvssData`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct MetricEntry {
    #[serde(rename = "cvssData", default)]
    pub cvss_data: CvssData,
    #[serde(rename = "baseSeverity", default)]
    pub base_severity: Option<String>,
    #[serde(rename = "exploitabilityScore", default)]
    pub exploitability_score: Option<f64>,
    #[serde(rename = "impactScore", default)]
    pub impact_score: Option<f64>,
    #[serde(rename = "acInsufInfo", default)]
    pub ac_insuf_info: Option<bool>,
    #[serde(rename = "obtainAllPrivilege", default)]
    pub obtain_all_privilege: Option<bool>,
    #[serde(rename = "obtainUserPrivilege", default)]
    pub obtain_user_privilege: Option<bool>,
    #[serde(rename = "obtainOtherPrivilege", default)]
    pub obtain_other_privilege: Option<bool>,
    #[serde(rename = "userInteractionRequired", default)]
    pub user_interaction_required: Option<bool>,
}

/// The vector body. Field names differ between the legacy and modern schemes
/// (accessVector vs attackVector and so on), so both spellings are present
/// and the normalizer picks by declared version.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct CvssData {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "vectorString", default)]
    pub vector_string: Option<String>,
    #[serde(rename = "baseScore", default)]
    pub base_score: Option<f64>,
    #[serde(rename = "baseSeverity", default)]
    pub base_severity: Option<String>,
    #[serde(rename = "accessVector", default)]
    pub access_vector: Option<String>,
    #[serde(rename = "accessComplexity", default)]
    pub access_complexity: Option<String>,
    #[serde(default)]
    pub authentication: Option<String>,
    #[serde(rename = "attackVector", default)]
    pub attack_vector: Option<String>,
    #[serde(rename = "attackComplexity", default)]
    pub attack_complexity: Option<String>,
    #[serde(rename = "privilegesRequired", default)]
    pub privileges_required: Option<String>,
    #[serde(rename = "confidentialityImpact", default)]
    pub confidentiality_impact: Option<String>,
    #[serde(rename = "integrityImpact", default)]
    pub integrity_impact: Option<String>,
    #[serde(rename = "availabilityImpact", default)]
    pub availability_impact: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Configuration {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Node {
    #[serde(rename = "cpeMatch", default)]
    pub cpe_match: Vec<CpeMatch>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct CpeMatch {
    #[serde(default)]
    pub vulnerable: Option<bool>,
    #[serde(default)]
    pub criteria: Option<String>,
    #[serde(rename = "matchCriteriaId", default)]
    pub match_criteria_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Reference {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const RECORD_FIXTURE: &str = include_str!("../fixtures/single_CVE-1999-0095.json");

    #[test_case("Analyzed", VulnStatus::Analyzed)]
    #[test_case("Awaiting Analysis", VulnStatus::AwaitingAnalysis)]
    #[test_case("Modified", VulnStatus::Modified)]
    #[test_case("Received", VulnStatus::Received)]
    #[test_case("Rejected", VulnStatus::Rejected)]
    #[test_case("Undergoing Analysis", VulnStatus::UndergoingAnalysis)]
    fn test_vuln_status_parses(raw: &str, expected: VulnStatus) {
        let status: VulnStatus = serde_json::from_str(&format!("\"{raw}\"")).unwrap();
        assert_eq!(status, expected);
        assert_eq!(status.as_str(), raw);
    }

    #[test]
    fn test_record_deserialization() {
        let cve: CVE = serde_json::from_str(RECORD_FIXTURE).unwrap();

        assert_eq!(cve.id, "CVE-1999-0095");
        assert_eq!(cve.source_identifier.as_deref(), Some("cve@mitre.org"));
        assert_eq!(cve.vuln_status, Some(VulnStatus::Modified));
        assert_eq!(cve.descriptions.len(), 2);
        assert_eq!(cve.references.len(), 2);
        assert_eq!(cve.metrics.cvss_metric_v2.len(), 1);
        assert_eq!(cve.metrics.cvss_metric_v31.len(), 1);

        let published = cve.published.unwrap();
        assert_eq!(published.format("%Y-%m-%d").to_string(), "1988-10-01");
    }

    #[test]
    fn test_metric_entry_fields_per_scheme() {
        let cve: CVE = serde_json::from_str(RECORD_FIXTURE).unwrap();

        let v2 = &cve.metrics.cvss_metric_v2[0];
        assert_eq!(v2.cvss_data.version.as_deref(), Some("2.0"));
        assert_eq!(v2.cvss_data.access_vector.as_deref(), Some("NETWORK"));
        assert_eq!(v2.cvss_data.attack_vector, None);
        assert_eq!(v2.base_severity.as_deref(), Some("HIGH"));
        assert_eq!(v2.ac_insuf_info, Some(false));

        let v31 = &cve.metrics.cvss_metric_v31[0];
        assert_eq!(v31.cvss_data.version.as_deref(), Some("3.1"));
        assert_eq!(v31.cvss_data.attack_vector.as_deref(), Some("NETWORK"));
        assert_eq!(v31.cvss_data.access_vector, None);
        assert_eq!(v31.cvss_data.base_severity.as_deref(), Some("CRITICAL"));
        assert_eq!(v31.ac_insuf_info, None);
    }

    #[test]
    fn test_unknown_vuln_status_is_tolerated() {
        let cve: CVE =
            serde_json::from_str(r#"{"id": "CVE-2038-0001", "vulnStatus": "Deferred"}"#).unwrap();
        assert_eq!(cve.vuln_status, Some(VulnStatus::Unknown));
        assert_eq!(cve.vuln_status.unwrap().as_str(), "Unknown");
    }

    #[test]
    fn test_absent_optional_structures_default_to_empty() {
        let cve: CVE = serde_json::from_str(r#"{"id": "CVE-2024-0001"}"#).unwrap();
        assert!(cve.descriptions.is_empty());
        assert!(cve.configurations.is_empty());
        assert!(cve.references.is_empty());
        assert!(cve.metrics.iter_all().next().is_none());
        assert!(cve.published.is_none());
    }
}
