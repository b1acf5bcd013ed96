use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hunt_core::OutputFormat;

/// Validate, render and run templated KQL hunting queries.
///
/// Settings default from the environment (and `.env`); flags override them.
#[derive(Parser, Debug)]
#[command(name = "hunt", version, about = "Validate, render and run KQL hunting queries")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every query under the queries root and write results
    Run(RunArgs),
    /// Show a query's metadata and its rendered KQL
    Render(RenderArgs),
    /// Validate, render and execute one query without writing results
    Check(CheckArgs),
    /// Schema-check query files or directories (no workspace needed)
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Discovery root (default: QUERIES_ROOT or `queries`)
    #[arg(long)]
    pub queries_root: Option<PathBuf>,

    /// Output root (default: INVESTIGATION_RESULTS_PATH or `<investigation>/results`)
    #[arg(long)]
    pub results_root: Option<PathBuf>,

    /// Investigation config (default: INVESTIGATION_CONFIG_PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log Analytics workspace id (default: SENTINEL_WORKSPACE_ID)
    #[arg(long)]
    pub workspace_id: Option<String>,

    /// ISO-8601 duration, e.g. P7D (default: QUERY_TIMESPAN)
    #[arg(long)]
    pub timespan: Option<String>,

    /// Result file format: csv or parquet (default: OUTPUT_FORMAT or csv)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Accept any UUID version in `id`, not only v4
    #[arg(long)]
    pub allow_legacy_ids: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// YAML query file
    pub query_file: PathBuf,

    /// Investigation config (default: INVESTIGATION_CONFIG_PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List the template variables the query needs
    #[arg(long)]
    pub show_variables: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML query file
    pub query_file: PathBuf,

    /// Investigation config (default: INVESTIGATION_CONFIG_PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print validation errors, rendered KQL and sample rows
    #[arg(long, env = "DETAILED_OUTPUT")]
    pub detailed: bool,

    /// Accept any UUID version in `id`, not only v4
    #[arg(long)]
    pub allow_legacy_ids: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Query files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Accept any UUID version in `id`, not only v4
    #[arg(long)]
    pub allow_legacy_ids: bool,
}
