//! YAML rule document types with serde deserialization.
//!
//! A rule document describes one parameterized KQL query plus the metadata
//! analysts use to triage it:
//!
//! ```yaml
//! title: Suspicious PowerShell Activity
//! id: 3f1c2b9e-8a4d-4c1e-9f3a-2b7d6e5c4a10
//! status: experimental
//! level: high
//! logsource: { product: windows, table: DeviceProcessEvents, category: process_creation }
//! kql: |
//!   DeviceProcessEvents
//!   | where DeviceName =~ '{{ device_name }}'
//! ```
//!
//! Structural checks live in [`crate::validation`]; deserializing into
//! [`RuleDocument`] assumes a document that already passed them.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level fields every rule document must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "id",
    "status",
    "description",
    "references",
    "author",
    "date",
    "modified",
    "tags",
    "logsource",
    "kql",
    "falsepositives",
    "level",
];

/// Fields every `logsource` mapping must carry.
pub const REQUIRED_LOGSOURCE_FIELDS: &[&str] = &["product", "table", "category"];

// ── Status / level enums ────────────────────────────────────────────

/// Maturity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Test,
    Experimental,
    Stable,
}

impl RuleStatus {
    pub const ALL: [RuleStatus; 3] = [RuleStatus::Test, RuleStatus::Experimental, RuleStatus::Stable];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Test => "test",
            RuleStatus::Experimental => "experimental",
            RuleStatus::Stable => "stable",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a rule's findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RuleLevel {
    pub const ALL: [RuleLevel; 4] = [
        RuleLevel::Low,
        RuleLevel::Medium,
        RuleLevel::High,
        RuleLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleLevel::Low => "low",
            RuleLevel::Medium => "medium",
            RuleLevel::High => "high",
            RuleLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Document ────────────────────────────────────────────────────────

/// Where the query's data comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSource {
    pub product: String,
    /// Log Analytics table the query reads, e.g. `DeviceProcessEvents`.
    pub table: String,
    pub category: String,
}

/// A named, versioned KQL query definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub title: String,
    /// UUID string; the version is enforced by the validator.
    pub id: String,
    pub status: RuleStatus,
    pub description: String,
    #[serde(deserialize_with = "seq_or_null")]
    pub references: Vec<String>,
    pub author: String,
    pub date: String,
    pub modified: String,
    #[serde(deserialize_with = "seq_or_null")]
    pub tags: IndexSet<String>,
    pub logsource: LogSource,
    /// Query template with `{{ variable }}` placeholders.
    pub kql: String,
    #[serde(deserialize_with = "seq_or_null")]
    pub falsepositives: Vec<String>,
    pub level: RuleLevel,
}

impl RuleDocument {
    /// Deserialize from a parsed YAML value.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_value(value)
    }

    /// Tags joined for display, in document order.
    pub fn tag_list(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Accept an explicit `null` (e.g. `falsepositives:` with no items) as empty.
fn seq_or_null<'de, D, C>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: Deserialize<'de> + Default,
{
    Ok(Option::<C>::deserialize(deserializer)?.unwrap_or_default())
}
