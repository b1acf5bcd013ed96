//! Field checks: required fields, logsource shape, kql, id format, enum membership.
//!
//! Each check only looks at fields that are present; absence is reported once
//! by [`validate_required`].

use serde_yaml::{Mapping, Value};
use uuid::Uuid;

use super::fuzzy::fuzzy_match;
use super::{IdPolicy, ValidationResult};
use crate::schema::{RuleLevel, RuleStatus, REQUIRED_FIELDS, REQUIRED_LOGSOURCE_FIELDS};

// ── Presence ────────────────────────────────────────────────────────

pub(super) fn validate_required(doc: &Mapping, result: &mut ValidationResult) {
    for &field in REQUIRED_FIELDS {
        if !doc.contains_key(field) {
            result.error(field, format!("Missing required top-level field: {field}"));
        }
    }
}

pub(super) fn validate_unknown_fields(doc: &Mapping, result: &mut ValidationResult) {
    for key in doc.keys() {
        let Some(key) = key.as_str() else {
            result.warn("", "Ignoring non-string top-level key");
            continue;
        };
        if REQUIRED_FIELDS.contains(&key) {
            continue;
        }
        let message = match fuzzy_match(key, REQUIRED_FIELDS) {
            Some(close) => format!("Unknown top-level field '{key}'. Did you mean '{close}'?"),
            None => format!("Unknown top-level field '{key}'"),
        };
        tracing::warn!(field = key, "unknown rule field");
        result.warn(key, message);
    }
}

// ── Structure ───────────────────────────────────────────────────────

pub(super) fn validate_logsource(doc: &Mapping, result: &mut ValidationResult) {
    let Some(logsource) = doc.get("logsource") else {
        return;
    };
    let Some(logsource) = logsource.as_mapping() else {
        result.error("logsource", "Field 'logsource' must be a mapping/dictionary.");
        return;
    };

    for &field in REQUIRED_LOGSOURCE_FIELDS {
        if !logsource.contains_key(field) {
            result.error(
                format!("logsource.{field}"),
                format!("Missing required logsource field: {field}"),
            );
        }
    }
}

pub(super) fn validate_kql(doc: &Mapping, result: &mut ValidationResult) {
    match doc.get("kql") {
        None => {}
        Some(Value::String(kql)) if !kql.trim().is_empty() => {}
        Some(_) => result.error("kql", "Field 'kql' must be a non-empty string."),
    }
}

pub(super) fn validate_id(doc: &Mapping, policy: IdPolicy, result: &mut ValidationResult) {
    let Some(id) = doc.get("id") else {
        return;
    };
    let Some(id) = id.as_str() else {
        result.error("id", "Field 'id' must be a string UUID.");
        return;
    };

    match Uuid::parse_str(id.trim()) {
        Err(_) => result.error("id", "Field 'id' must be a valid UUID string."),
        Ok(uuid) if policy == IdPolicy::UuidV4 && uuid.get_version_num() != 4 => {
            result.error("id", "Field 'id' must be a UUID v4.");
        }
        Ok(_) => {}
    }
}

// ── Enums ───────────────────────────────────────────────────────────

pub(super) fn validate_enums(doc: &Mapping, result: &mut ValidationResult) {
    let statuses: Vec<&str> = RuleStatus::ALL.iter().map(RuleStatus::as_str).collect();
    check_member(doc, "status", &statuses, result);

    let levels: Vec<&str> = RuleLevel::ALL.iter().map(RuleLevel::as_str).collect();
    check_member(doc, "level", &levels, result);
}

fn check_member(doc: &Mapping, field: &str, allowed: &[&str], result: &mut ValidationResult) {
    let Some(value) = doc.get(field) else {
        return;
    };
    if value.as_str().is_some_and(|v| allowed.contains(&v)) {
        return;
    }

    let mut sorted = allowed.to_vec();
    sorted.sort_unstable();
    let message = format!("Field '{field}' must be one of: {}", sorted.join(", "));
    let suggestion = value
        .as_str()
        .and_then(|v| fuzzy_match(v, allowed))
        .map(|close| format!("Did you mean '{close}'?"));
    result.error_with_suggestion(field, message, suggestion);
}
