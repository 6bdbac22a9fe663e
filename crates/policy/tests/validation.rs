//! Loader validation behavior: aggregate errors, rule budget, and the
//! mode/defaultAction reconciliation rules.

use policy::from_document_str;

#[test]
fn empty_document_loads_as_deny_all() {
    let p = from_document_str("{}\n").unwrap();
    assert!(p.allow().is_empty() && p.deny().is_empty());
}

#[test]
fn rule_count_of_1001_is_rejected() {
    let entries: Vec<String> =
        (0..1001).map(|i| format!("10.{}.{}.0/32", i / 256, i % 256)).collect();
    let yaml = serde_yaml::to_string(&serde_json::json!({ "allowList": entries })).unwrap();
    assert!(from_document_str(&yaml).is_err());
}

#[test]
fn unknown_document_field_is_rejected() {
    assert!(from_document_str("unknownThing: 1\n").is_err());
}

#[test]
fn malformed_yaml_is_rejected() {
    assert!(from_document_str("allowList: [this is not closed\n").is_err());
}

#[test]
fn both_mode_requires_default_action() {
    let yaml = r#"
mode: both
allowList: ["10.0.0.0/8"]
"#;
    assert!(from_document_str(yaml).is_err());
}

#[test]
fn whitelist_mode_with_contradicting_default_action_is_rejected() {
    let yaml = r#"
mode: whitelist
defaultAction: allow
"#;
    assert!(from_document_str(yaml).is_err());
}
