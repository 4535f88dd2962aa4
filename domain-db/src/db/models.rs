use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::{cve_cpe, cve_description, cve_impact, cve_references, cves};

// Each row struct carries exactly the columns this pipeline writes; the
// surrogate ids and `_created_at`/`_modified_at` audit columns are maintained
// by the database. `treat_none_as_null` makes a re-sync overwrite every
// non-key column, absent upstream values included.

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = cves, treat_none_as_null = true)]
pub struct NewCve {
    pub id: String,
    pub published_at: Option<NaiveDateTime>,
    pub last_modified_at: Option<NaiveDateTime>,
    pub source_identifier: Option<String>,
    pub vuln_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = cve_description, treat_none_as_null = true)]
pub struct NewCveDescription {
    pub cve_id: String,
    pub lang: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = cve_impact, treat_none_as_null = true)]
pub struct NewCveImpact {
    pub cve_id: String,
    pub version: String,
    pub base_score: Option<f64>,
    pub base_severity: Option<String>,
    pub vector_string: Option<String>,
    pub access_vector: Option<String>,
    pub access_complexity: Option<String>,
    pub authentication: Option<String>,
    pub confidentiality_impact: Option<String>,
    pub integrity_impact: Option<String>,
    pub availability_impact: Option<String>,
    pub exploitability_score: Option<f64>,
    pub impact_score: Option<f64>,
    pub ac_insuf_info: Option<bool>,
    pub obtain_all_privilege: Option<bool>,
    pub obtain_user_privilege: Option<bool>,
    pub obtain_other_privilege: Option<bool>,
    pub user_interaction_required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = cve_cpe, treat_none_as_null = true)]
pub struct NewCveCpe {
    pub cve_id: String,
    pub match_criteria_id: String,
    pub cpe23_uri: Option<String>,
    pub flag_vulnerable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = cve_references, treat_none_as_null = true)]
pub struct NewCveReference {
    pub cve_id: String,
    pub url: String,
    pub source: Option<String>,
}
