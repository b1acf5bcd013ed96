use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

/// What happened to one rule document.
///
/// Stage flags are monotone: a later flag is only set when every earlier
/// one is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub path: PathBuf,
    pub structurally_valid: bool,
    pub rendered: bool,
    pub executed: bool,
    pub persisted: bool,
    /// Rows returned by the executor; kept when persisting fails.
    pub record_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// First failure, prefixed with its stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutcome {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            structurally_valid: false,
            rendered: false,
            executed: false,
            persisted: false,
            record_count: 0,
            output_path: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Every stage completed, results written.
    pub fn succeeded(&self) -> bool {
        self.persisted && self.error.is_none()
    }
}

/// Aggregate of one batch run.
///
/// A document counts as failed unless it was persisted, so `executed` can
/// exceed `persisted` when writing results fails.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub executed: usize,
    pub persisted: usize,
    pub failed: usize,
    pub outcomes: Vec<RunOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<RunOutcome>) -> Self {
        let executed = outcomes.iter().filter(|o| o.executed).count();
        let persisted = outcomes.iter().filter(|o| o.succeeded()).count();
        Self {
            total: outcomes.len(),
            executed,
            persisted,
            failed: outcomes.len() - persisted,
            outcomes,
            completed_at: Utc::now(),
        }
    }

    /// `(path, error)` for every failed document, in processing order.
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        self.outcomes
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| (o.path.as_path(), o.error.as_deref().unwrap_or("unknown error")))
            .collect()
    }

    /// At least one document ran and none failed.
    pub fn is_success(&self) -> bool {
        self.total > 0 && self.failed == 0
    }

    pub fn log(&self) {
        info!("=== SUMMARY ===");
        info!("Total files processed: {}", self.total);
        info!("Executed: {}", self.executed);
        info!("Persisted: {}", self.persisted);
        info!("Failed runs: {}", self.failed);
        for (path, err) in self.failures() {
            error!("  - {}: {}", path.display(), err);
        }
        info!("Completed at {}", self.completed_at.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(path: &str) -> RunOutcome {
        RunOutcome {
            structurally_valid: true,
            rendered: true,
            executed: true,
            persisted: true,
            record_count: 2,
            ..RunOutcome::new(path)
        }
    }

    fn failed(path: &str, error: &str) -> RunOutcome {
        RunOutcome {
            error: Some(error.into()),
            ..RunOutcome::new(path)
        }
    }

    #[test]
    fn counts_and_failures() {
        let summary = RunSummary::from_outcomes(vec![
            done("a.yaml"),
            failed("b.yaml", "Validation error: Missing required top-level field: kql"),
            done("c.yaml"),
        ]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.persisted, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());

        let failures = summary.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, Path::new("b.yaml"));
        assert!(failures[0].1.starts_with("Validation error"));
    }

    #[test]
    fn executed_but_unpersisted_counts_as_failure() {
        let unwritten = RunOutcome {
            structurally_valid: true,
            rendered: true,
            executed: true,
            record_count: 3,
            error: Some("Persist error: disk full".into()),
            ..RunOutcome::new("b.yaml")
        };
        let summary = RunSummary::from_outcomes(vec![done("a.yaml"), unwritten]);
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.persisted, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn empty_run_is_not_success() {
        let summary = RunSummary::from_outcomes(vec![]);
        assert_eq!(summary.total, 0);
        assert!(!summary.is_success());
        assert!(RunSummary::from_outcomes(vec![done("a.yaml")]).is_success());
    }

    #[test]
    fn serializes_without_empty_optionals() {
        let summary = RunSummary::from_outcomes(vec![done("a.yaml")]);
        let json = serde_json::to_value(&summary).unwrap();
        let outcome = &json["outcomes"][0];
        assert_eq!(outcome["record_count"], 2);
        assert!(outcome.get("error").is_none());
        assert!(outcome.get("warnings").is_none());
        assert!(json["completed_at"].is_string());
    }
}
