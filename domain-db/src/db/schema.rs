diesel::table! {
    cves (id) {
        id -> Varchar,
        published_at -> Nullable<Timestamp>,
        last_modified_at -> Nullable<Timestamp>,
        source_identifier -> Nullable<Text>,
        vuln_status -> Nullable<Text>,
        _created_at -> Timestamptz,
        _modified_at -> Timestamptz,
    }
}

diesel::table! {
    cve_description (id) {
        id -> Int4,
        cve_id -> Varchar,
        lang -> Text,
        value -> Nullable<Text>,
        _created_at -> Timestamptz,
        _modified_at -> Timestamptz,
    }
}

diesel::table! {
    cve_impact (id) {
        id -> Int4,
        cve_id -> Varchar,
        version -> Text,
        base_score -> Nullable<Float8>,
        base_severity -> Nullable<Text>,
        vector_string -> Nullable<Text>,
        access_vector -> Nullable<Text>,
        access_complexity -> Nullable<Text>,
        authentication -> Nullable<Text>,
        confidentiality_impact -> Nullable<Text>,
        integrity_impact -> Nullable<Text>,
        availability_impact -> Nullable<Text>,
        exploitability_score -> Nullable<Float8>,
        impact_score -> Nullable<Float8>,
        ac_insuf_info -> Nullable<Bool>,
        obtain_all_privilege -> Nullable<Bool>,
        obtain_user_privilege -> Nullable<Bool>,
        obtain_other_privilege -> Nullable<Bool>,
        user_interaction_required -> Nullable<Bool>,
        _created_at -> Timestamptz,
        _modified_at -> Timestamptz,
    }
}

diesel::table! {
    cve_cpe (id) {
        id -> Int4,
        cve_id -> Varchar,
        match_criteria_id -> Varchar,
        cpe23_uri -> Nullable<Text>,
        flag_vulnerable -> Nullable<Bool>,
        _created_at -> Timestamptz,
        _modified_at -> Timestamptz,
    }
}

diesel::table! {
    cve_references (id) {
        id -> Int4,
        cve_id -> Varchar,
        url -> Text,
        source -> Nullable<Text>,
        _created_at -> Timestamptz,
        _modified_at -> Timestamptz,
    }
}

diesel::joinable!(cve_description -> cves (cve_id));
diesel::joinable!(cve_impact -> cves (cve_id));
diesel::joinable!(cve_cpe -> cves (cve_id));
diesel::joinable!(cve_references -> cves (cve_id));

diesel::allow_tables_to_appear_in_same_query!(
    cves,
    cve_description,
    cve_impact,
    cve_cpe,
    cve_references,
);
