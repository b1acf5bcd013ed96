//! Sequential batch runner.
//!
//! Each document moves through YAML check, render, execute and export. The
//! first failing stage ends that document's processing; the batch continues.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use hunt_core::InvestigationConfig;
use hunt_kusto::QueryExecutor;
use hunt_rules::{validate_document_with, RuleDocument, RuleLoader};
use hunt_template::QueryRenderer;
use serde_yaml::Value;
use tracing::{error, info, warn};

use crate::error::{PipelineError, StageError};
use crate::options::PipelineOptions;
use crate::outcome::{RunOutcome, RunSummary};
use crate::persist::{persist, results_path};
use crate::variables::template_variables;

/// Runs every rule document under the queries root against one executor.
pub struct PipelineRunner<'a> {
    executor: &'a dyn QueryExecutor,
    variables: BTreeMap<String, Value>,
    options: PipelineOptions,
    renderer: QueryRenderer,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        options: PipelineOptions,
        config: &InvestigationConfig,
        executor: &'a dyn QueryExecutor,
    ) -> Self {
        Self {
            executor,
            variables: template_variables(config),
            options,
            renderer: QueryRenderer::new(),
        }
    }

    /// Discover and process every document, one at a time, in path order.
    ///
    /// Only discovery failure aborts the run. Per-document failures are
    /// recorded in the summary.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let files = RuleLoader::new(&self.options.queries_root).discover()?;
        if files.is_empty() {
            warn!(
                "No YAML query files found under {}",
                self.options.queries_root.display()
            );
        } else {
            info!("Discovered {} YAML query files.", files.len());
        }

        let mut outcomes = Vec::with_capacity(files.len());
        for path in &files {
            outcomes.push(self.process(path).await);
        }

        let summary = RunSummary::from_outcomes(outcomes);
        summary.log();
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "run finished");
        Ok(summary)
    }

    /// Process one document. Never fails; the error lands in the outcome.
    pub async fn process(&self, path: &Path) -> RunOutcome {
        info!("=== {} ===", path.display());
        let mut outcome = RunOutcome::new(path);
        if let Err(err) = self.advance(path, &mut outcome).await {
            error!(path = %path.display(), stage = err.stage(), "[{}] FAILED: {}", err.stage(), err);
            outcome.error = Some(err.to_string());
        }
        outcome
    }

    async fn advance(&self, path: &Path, outcome: &mut RunOutcome) -> Result<(), StageError> {
        // YAML check
        let value = RuleLoader::read_value(path).map_err(|e| StageError::Unexpected(e.to_string()))?;
        let report = validate_document_with(&value, self.options.id_policy);
        for warning in &report.warnings {
            warn!(field = %warning.path, "[YAML CHECK] {}", warning.message);
        }
        outcome.warnings = report.warnings.iter().map(|w| w.message.clone()).collect();
        if !report.valid {
            for message in report.messages() {
                error!("[YAML CHECK]   - {message}");
            }
            return Err(StageError::Validation(report.messages()));
        }
        let document = RuleDocument::from_value(value)
            .map_err(|e| StageError::Validation(vec![e.to_string()]))?;
        outcome.structurally_valid = true;
        info!("[YAML CHECK] PASSED: {}", document.title);

        // Render
        let query = self.renderer.render(&document.kql, &self.variables)?;
        outcome.rendered = true;
        info!("[RENDER] SUCCEEDED");

        // Execute
        let result = self
            .executor
            .execute(
                &self.options.workspace_id,
                &query,
                self.options.timespan.as_deref(),
            )
            .await?;
        outcome.executed = true;
        outcome.record_count = result.row_count() as u64;
        info!("[QUERY EXECUTION] SUCCEEDED in {}ms", result.metadata.execution_time_ms);
        if result.metadata.partial {
            warn!(
                "[QUERY EXECUTION] partial result: {}",
                result.metadata.partial_error.as_deref().unwrap_or("no detail")
            );
        }
        info!("[RESULTS] Records returned: {}", outcome.record_count);

        // Export
        let target = results_path(
            &self.options.queries_root,
            &self.options.results_root,
            path,
            self.options.output_format,
        )?;
        let written = persist(&result, &target, self.options.output_format)?;
        info!("[EXPORT] Wrote {} rows to {}", written, target.display());
        outcome.persisted = true;
        outcome.output_path = Some(target);
        Ok(())
    }
}
