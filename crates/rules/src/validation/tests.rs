//! Tests for the rule document validator.

use super::*;

const VALID_YAML: &str = r#"
title: Suspicious PowerShell Activity
id: 3f1c2b9e-8a4d-4c1e-9f3a-2b7d6e5c4a10
status: experimental
description: PowerShell launched with an encoded command
references:
  - https://attack.mitre.org/techniques/T1059/001/
author: Hunt Team
date: 2025-01-15
modified: 2025-02-01
tags:
  - attack.execution
logsource:
  product: windows
  table: DeviceProcessEvents
  category: process_creation
kql: |
  DeviceProcessEvents
  | where DeviceName =~ '{{ device_name }}'
falsepositives:
  - Admin scripts
level: high
"#;

fn doc(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

fn valid_doc() -> Value {
    doc(VALID_YAML)
}

fn set(doc: &mut Value, key: &str, value: Value) {
    doc.as_mapping_mut().unwrap().insert(Value::from(key), value);
}

fn remove(doc: &mut Value, key: &str) {
    doc.as_mapping_mut().unwrap().remove(key);
}

fn error_paths(result: &ValidationResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.path.as_str()).collect()
}

#[test]
fn valid_document_passes() {
    let result = validate_document(&valid_doc());
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn three_defects_produce_exactly_three_errors() {
    let mut d = valid_doc();
    remove(&mut d, "kql");
    set(&mut d, "id", Value::from("not-a-uuid"));
    set(&mut d, "status", Value::from("bogus"));

    let result = validate_document(&d);
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    assert_eq!(error_paths(&result), vec!["kql", "id", "status"]);
    assert_eq!(result.errors[0].message, "Missing required top-level field: kql");
    assert_eq!(result.errors[1].message, "Field 'id' must be a valid UUID string.");
    assert_eq!(
        result.errors[2].message,
        "Field 'status' must be one of: experimental, stable, test"
    );
}

#[test]
fn two_missing_fields_and_bad_id() {
    let mut d = valid_doc();
    remove(&mut d, "author");
    remove(&mut d, "tags");
    set(&mut d, "id", Value::from("12345"));

    let result = validate_document(&d);
    assert_eq!(result.errors.len(), 3);
    assert_eq!(error_paths(&result), vec!["author", "tags", "id"]);
}

#[test]
fn empty_mapping_reports_every_required_field() {
    let result = validate_yaml("{}");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), crate::schema::REQUIRED_FIELDS.len());
}

#[test]
fn non_mapping_document_is_one_extra_error() {
    let result = validate_yaml("- just\n- a list\n");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), crate::schema::REQUIRED_FIELDS.len() + 1);
    assert!(result.errors[0].message.contains("must be a mapping"));
    assert!(result.errors[0].message.contains("got list"));
}

#[test]
fn yaml_parse_error_is_reported() {
    let result = validate_yaml("title: [unclosed");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.starts_with("YAML parse error"));
}

// ── logsource ───────────────────────────────────────────────────────

#[test]
fn logsource_must_be_a_mapping() {
    let mut d = valid_doc();
    set(&mut d, "logsource", Value::from("windows"));

    let result = validate_document(&d);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].message,
        "Field 'logsource' must be a mapping/dictionary."
    );
}

#[test]
fn logsource_missing_subfields() {
    let mut d = valid_doc();
    set(&mut d, "logsource", doc("product: windows"));

    let result = validate_document(&d);
    assert_eq!(error_paths(&result), vec!["logsource.table", "logsource.category"]);
    assert_eq!(result.errors[0].message, "Missing required logsource field: table");
}

// ── kql ─────────────────────────────────────────────────────────────

#[test]
fn blank_kql_is_rejected() {
    for bad in [Value::from("   \n"), Value::from(""), Value::from(42), Value::Null] {
        let mut d = valid_doc();
        set(&mut d, "kql", bad);
        let result = validate_document(&d);
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        assert_eq!(result.errors[0].message, "Field 'kql' must be a non-empty string.");
    }
}

// ── id ──────────────────────────────────────────────────────────────

#[test]
fn id_must_be_a_string() {
    let mut d = valid_doc();
    set(&mut d, "id", Value::from(7));
    let result = validate_document(&d);
    assert_eq!(result.errors[0].message, "Field 'id' must be a string UUID.");
}

#[test]
fn non_v4_uuid_is_rejected_by_default() {
    let mut d = valid_doc();
    // version nibble = 1
    set(&mut d, "id", Value::from("c232ab00-9414-11ec-b3c8-9f6bdeced846"));

    let result = validate_document(&d);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].message, "Field 'id' must be a UUID v4.");

    let relaxed = validate_document_with(&d, IdPolicy::AnyUuid);
    assert!(relaxed.valid);
}

#[test]
fn malformed_uuid_fails_under_any_policy() {
    let mut d = valid_doc();
    set(&mut d, "id", Value::from("3f1c2b9e-zzzz"));
    assert!(!validate_document_with(&d, IdPolicy::AnyUuid).valid);
}

// ── enums ───────────────────────────────────────────────────────────

#[test]
fn level_outside_allowed_set() {
    let mut d = valid_doc();
    set(&mut d, "level", Value::from("severe"));

    let result = validate_document(&d);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].message,
        "Field 'level' must be one of: critical, high, low, medium"
    );
}

#[test]
fn close_status_carries_suggestion() {
    let mut d = valid_doc();
    set(&mut d, "status", Value::from("stabel"));

    let result = validate_document(&d);
    assert_eq!(result.errors[0].suggestion.as_deref(), Some("Did you mean 'stable'?"));
    assert_eq!(
        result.messages(),
        vec!["Field 'status' must be one of: experimental, stable, test Did you mean 'stable'?"]
    );
}

#[test]
fn enum_values_are_case_sensitive() {
    let mut d = valid_doc();
    set(&mut d, "level", Value::from("High"));
    assert!(!validate_document(&d).valid);
}

// ── warnings ────────────────────────────────────────────────────────

#[test]
fn unknown_field_warns_without_invalidating() {
    let mut d = valid_doc();
    set(&mut d, "refrences", Value::from("x"));
    set(&mut d, "xyzzy_custom_blob", Value::from("y"));

    let result = validate_document(&d);
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 2);
    assert!(result.warnings[0].message.contains("Did you mean 'references'?"));
    assert_eq!(result.warnings[1].message, "Unknown top-level field 'xyzzy_custom_blob'");
}
