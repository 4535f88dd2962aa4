use crate::db::models::{NewCve, NewCveCpe, NewCveDescription, NewCveImpact, NewCveReference};

use super::cve::{CVE, MetricEntry};

/// Row accumulator for one page of the feed. Each record fans out into the
/// five row-sets; batches are handed to the persister table by table.
#[derive(Debug, Default)]
pub struct PageRows {
    pub cves: Vec<NewCve>,
    pub descriptions: Vec<NewCveDescription>,
    pub impacts: Vec<NewCveImpact>,
    pub cpe_matches: Vec<NewCveCpe>,
    pub references: Vec<NewCveReference>,
    /// metric entries dropped for carrying an unrecognized scoring version
    pub skipped_metrics: u32,
}

/// Flattens one upstream record into `rows`. Pure, no I/O; absent optional
/// structures contribute zero rows instead of failing.
pub fn extract_record(item: &CVE, rows: &mut PageRows) {
    extract_cve(item, &mut rows.cves);
    extract_descriptions(item, &mut rows.descriptions);
    rows.skipped_metrics += extract_metrics(item, &mut rows.impacts);
    extract_cpe_matches(item, &mut rows.cpe_matches);
    extract_references(item, &mut rows.references);
}

/// Exactly one core row per record, appended unconditionally.
fn extract_cve(item: &CVE, rows: &mut Vec<NewCve>) {
    rows.push(NewCve {
        id: item.id.clone(),
        published_at: item.published,
        last_modified_at: item.last_modified,
        source_identifier: item.source_identifier.clone(),
        vuln_status: item.vuln_status.map(|status| status.as_str().to_string()),
    });
}

fn extract_descriptions(item: &CVE, rows: &mut Vec<NewCveDescription>) {
    for description in &item.descriptions {
        rows.push(NewCveDescription {
            cve_id: item.id.clone(),
            lang: description.lang.clone().unwrap_or_default(),
            value: description.value.clone(),
        });
    }
}

/// One row per metric entry, families walked in fixed priority order. The
/// extraction rule follows the entry's own declared scoring version, not the
/// family list it was found under; the feed has been seen nesting entries
/// under the wrong key. Returns the number of entries skipped for an
/// unrecognized version.
fn extract_metrics(item: &CVE, rows: &mut Vec<NewCveImpact>) -> u32 {
    let mut skipped = 0;

    for entry in item.metrics.iter_all() {
        match entry.cvss_data.version.as_deref() {
            Some("2.0") => rows.push(legacy_impact_row(&item.id, entry)),
            Some(version @ ("3.0" | "3.1")) => {
                rows.push(modern_impact_row(&item.id, version, entry))
            }
            version => {
                skipped += 1;
                log::warn!(
                    "skipping metric entry with unrecognized scoring version {:?} on {}",
                    version,
                    item.id
                );
            }
        }
    }

    skipped
}

/// CVSS 2.0: severity lives at the entry level, the vector fields carry the
/// access* names and the insufficient-info flag is meaningful.
fn legacy_impact_row(cve_id: &str, entry: &MetricEntry) -> NewCveImpact {
    let cvss = &entry.cvss_data;
    NewCveImpact {
        cve_id: cve_id.to_string(),
        version: "2.0".to_string(),
        base_score: cvss.base_score,
        base_severity: entry.base_severity.clone(),
        vector_string: cvss.vector_string.clone(),
        access_vector: cvss.access_vector.clone(),
        access_complexity: cvss.access_complexity.clone(),
        authentication: cvss.authentication.clone(),
        confidentiality_impact: cvss.confidentiality_impact.clone(),
        integrity_impact: cvss.integrity_impact.clone(),
        availability_impact: cvss.availability_impact.clone(),
        exploitability_score: entry.exploitability_score,
        impact_score: entry.impact_score,
        ac_insuf_info: entry.ac_insuf_info,
        obtain_all_privilege: entry.obtain_all_privilege,
        obtain_user_privilege: entry.obtain_user_privilege,
        obtain_other_privilege: entry.obtain_other_privilege,
        user_interaction_required: entry.user_interaction_required,
    }
}

/// CVSS 3.x: everything of interest lives under `cvssData` with the attack*
/// names; privileges-required fills the slot the legacy scheme uses for
/// authentication, and the insufficient-info flag stays null.
fn modern_impact_row(cve_id: &str, version: &str, entry: &MetricEntry) -> NewCveImpact {
    let cvss = &entry.cvss_data;
    NewCveImpact {
        cve_id: cve_id.to_string(),
        version: version.to_string(),
        base_score: cvss.base_score,
        base_severity: cvss.base_severity.clone(),
        vector_string: cvss.vector_string.clone(),
        access_vector: cvss.attack_vector.clone(),
        access_complexity: cvss.attack_complexity.clone(),
        authentication: cvss.privileges_required.clone(),
        confidentiality_impact: cvss.confidentiality_impact.clone(),
        integrity_impact: cvss.integrity_impact.clone(),
        availability_impact: cvss.availability_impact.clone(),
        exploitability_score: entry.exploitability_score,
        impact_score: entry.impact_score,
        ac_insuf_info: None,
        obtain_all_privilege: entry.obtain_all_privilege,
        obtain_user_privilege: entry.obtain_user_privilege,
        obtain_other_privilege: entry.obtain_other_privilege,
        user_interaction_required: entry.user_interaction_required,
    }
}

/// Flattens configurations -> nodes -> cpeMatch leaves, one row per match.
/// No deduplication here; reconciliation by key happens at persistence.
fn extract_cpe_matches(item: &CVE, rows: &mut Vec<NewCveCpe>) {
    for configuration in &item.configurations {
        for node in &configuration.nodes {
            for cpe_match in &node.cpe_match {
                rows.push(NewCveCpe {
                    cve_id: item.id.clone(),
                    match_criteria_id: cpe_match.match_criteria_id.clone().unwrap_or_default(),
                    cpe23_uri: cpe_match.criteria.clone(),
                    flag_vulnerable: cpe_match.vulnerable,
                });
            }
        }
    }
}

fn extract_references(item: &CVE, rows: &mut Vec<NewCveReference>) {
    for reference in &item.references {
        rows.push(NewCveReference {
            cve_id: item.id.clone(),
            url: reference.url.clone().unwrap_or_default(),
            source: reference.source.clone(),
        });
    }
}
