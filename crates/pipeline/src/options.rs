use std::path::PathBuf;

use hunt_core::{HuntConfig, OutputFormat, StartupError};
use hunt_rules::IdPolicy;

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Discovery root; result paths mirror the layout below it.
    pub queries_root: PathBuf,
    pub results_root: PathBuf,
    pub workspace_id: String,
    /// ISO-8601 duration handed to the executor.
    pub timespan: Option<String>,
    pub output_format: OutputFormat,
    pub id_policy: IdPolicy,
}

impl PipelineOptions {
    /// Options from process config. Fails when the workspace id is unset.
    pub fn from_config(config: &HuntConfig) -> Result<Self, StartupError> {
        Ok(Self {
            queries_root: config.queries_root.clone(),
            results_root: config.results_root.clone(),
            workspace_id: config.require_workspace_id()?.to_string(),
            timespan: config.timespan.clone(),
            output_format: config.output_format,
            id_policy: IdPolicy::default(),
        })
    }
}
