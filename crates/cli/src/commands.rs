//! Subcommand handlers. Each returns the process exit code; errors that
//! stop a command before it can report are returned as `anyhow` errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use hunt_core::{HuntConfig, InvestigationConfig};
use hunt_kusto::{LogAnalyticsClient, LogAnalyticsConfig, QueryExecutor, QueryResult};
use hunt_pipeline::variables::template_variables;
use hunt_pipeline::{PipelineOptions, PipelineRunner, RunSummary};
use hunt_rules::{validate_document_with, IdPolicy, RuleDocument, RuleLoader};
use hunt_template::QueryRenderer;
use tracing::info;

use crate::cli::{CheckArgs, RenderArgs, RunArgs, ValidateArgs};
use crate::terminal::Terminal;

const SAMPLE_ROWS: usize = 5;

fn id_policy(allow_legacy_ids: bool) -> IdPolicy {
    if allow_legacy_ids {
        IdPolicy::AnyUuid
    } else {
        IdPolicy::UuidV4
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_investigation(path: &Path) -> Result<InvestigationConfig> {
    InvestigationConfig::load(path)
        .with_context(|| format!("failed to load investigation config {}", path.display()))
}

// ── run ───────────────────────────────────────────────────────────

pub async fn run(args: RunArgs) -> Result<ExitCode> {
    let mut config = HuntConfig::from_env()?;
    if let Some(path) = args.config {
        config.investigation_config_path = path;
    }
    if let Some(root) = args.queries_root {
        config.queries_root = root;
    }
    if let Some(root) = args.results_root {
        config.results_root = root;
    }
    if args.workspace_id.is_some() {
        config.workspace_id = args.workspace_id;
    }
    if args.timespan.is_some() {
        config.timespan = args.timespan;
    }
    if let Some(format) = args.format {
        config.output_format = format;
    }
    config.log_summary();

    let mut options = PipelineOptions::from_config(&config)?;
    options.id_policy = id_policy(args.allow_legacy_ids);

    let investigation = load_investigation(&config.investigation_config_path)?;
    investigation
        .validate_required(&config.required_keys)
        .context("investigation config is incomplete")?;
    info!("Loaded {} configuration variables", investigation.len());

    let client = LogAnalyticsClient::new(LogAnalyticsConfig::from_env())?;
    let runner = PipelineRunner::new(options, &investigation, &client);
    let summary = runner.run().await?;

    Terminal::new().print_summary(&summary)?;
    if let Some(path) = &args.report {
        write_report(&summary, path)?;
        info!("Run report written to {}", path.display());
    }
    Ok(exit_code(summary.is_success()))
}

/// Serialize the summary as pretty JSON, creating parent directories.
pub fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

// ── render ────────────────────────────────────────────────────────

pub fn render(args: RenderArgs) -> Result<ExitCode> {
    let terminal = Terminal::new();
    let query = RuleLoader::load_query(&args.query_file)?;
    terminal.print_metadata(&query.raw)?;

    let renderer = QueryRenderer::new();
    if args.show_variables {
        terminal.print_section("TEMPLATE VARIABLES REQUIRED:")?;
        for name in renderer.discover_variables(&query.kql) {
            terminal.print_line(&format!("  - {name}"))?;
        }
        terminal.print_rule()?;
    }

    let config_path = investigation_path(args.config)?;
    terminal.print_info(&format!("Loading config: {}", config_path.display()))?;
    let investigation = load_investigation(&config_path)?;
    terminal.print_info(&format!(
        "Loaded {} configuration variables",
        investigation.len()
    ))?;

    let rendered = renderer
        .render(&query.kql, &template_variables(&investigation))
        .with_context(|| format!("failed to render {}", args.query_file.display()))?;

    terminal.print_section("RENDERED KQL QUERY:")?;
    terminal.print_line(rendered.trim_end())?;
    terminal.print_rule()?;
    terminal.print_info(&format!("Config used: {}", config_path.display()))?;
    terminal.print_info(&format!("Query file: {}", args.query_file.display()))?;
    Ok(ExitCode::SUCCESS)
}

fn investigation_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path),
        None => Ok(HuntConfig::from_env()?.investigation_config_path),
    }
}

// ── check ─────────────────────────────────────────────────────────

pub async fn check(args: CheckArgs) -> Result<ExitCode> {
    let terminal = Terminal::new();
    let config = HuntConfig::from_env()?;
    let workspace_id = config.require_workspace_id()?.to_string();

    let raw = RuleLoader::read_value(&args.query_file)?;
    let report = validate_document_with(&raw, id_policy(args.allow_legacy_ids));
    terminal.print_status("YAML CHECK", report.valid)?;
    if !report.valid {
        if args.detailed {
            terminal.print_validation(&args.query_file, &report)?;
        }
        return Ok(ExitCode::FAILURE);
    }
    let document = RuleDocument::from_value(raw)?;
    if args.detailed {
        terminal.print_info(&format!("Title: {}", document.title))?;
        terminal.print_info(&format!("ID: {}", document.id))?;
        terminal.print_info(&format!("Status: {}", document.status))?;
        terminal.print_info(&format!("Level: {}", document.level))?;
        terminal.print_info(&format!("Tags: {}", document.tag_list()))?;
        terminal.print_info(&format!("Logsource table: {}", document.logsource.table))?;
    }

    let config_path = args.config.unwrap_or(config.investigation_config_path);
    let investigation = load_investigation(&config_path)?;
    let rendered = match QueryRenderer::new().render(&document.kql, &template_variables(&investigation)) {
        Ok(query) => query,
        Err(err) => {
            terminal.print_status("RENDER", false)?;
            terminal.print_error(&err.to_string())?;
            return Ok(ExitCode::FAILURE);
        }
    };
    terminal.print_status("RENDER", true)?;
    if args.detailed {
        terminal.print_section("RENDERED KQL QUERY:")?;
        terminal.print_line(rendered.trim_end())?;
        terminal.print_rule()?;
    }

    let client = LogAnalyticsClient::new(LogAnalyticsConfig::from_env())?;
    let result = match client
        .execute(&workspace_id, &rendered, config.timespan.as_deref())
        .await
    {
        Ok(result) => result,
        Err(err) => {
            terminal.print_status("QUERY EXECUTION", false)?;
            terminal.print_error(&err.to_string())?;
            return Ok(ExitCode::FAILURE);
        }
    };
    terminal.print_status("QUERY EXECUTION", true)?;
    terminal.print_line(&format!("[RESULTS] Records returned: {}", result.row_count()))?;
    if args.detailed {
        if result.is_empty() {
            terminal.print_info("No rows returned.")?;
        } else {
            terminal.print_line(&sample(&result).to_string())?;
        }
    }
    terminal.print_info(&format!(
        "Query file validation and execution completed at {}",
        chrono::Utc::now().to_rfc3339()
    ))?;
    Ok(ExitCode::SUCCESS)
}

/// The first few rows of `result`, metadata kept.
fn sample(result: &QueryResult) -> QueryResult {
    QueryResult {
        columns: result.columns.clone(),
        rows: result.rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        metadata: result.metadata.clone(),
    }
}

// ── validate ──────────────────────────────────────────────────────

pub fn validate(args: ValidateArgs) -> Result<ExitCode> {
    let terminal = Terminal::new();
    let policy = id_policy(args.allow_legacy_ids);

    let files = collect_files(&args.paths)?;
    if files.is_empty() {
        terminal.print_error("no YAML query files found")?;
        return Ok(ExitCode::FAILURE);
    }

    let mut invalid = 0usize;
    for path in &files {
        let report = match RuleLoader::read_value(path) {
            Ok(raw) => validate_document_with(&raw, policy),
            Err(err) => {
                terminal.print_status(&path.display().to_string(), false)?;
                terminal.print_error(&err.to_string())?;
                invalid += 1;
                continue;
            }
        };
        if !report.valid {
            invalid += 1;
        }
        terminal.print_validation(path, &report)?;
    }

    terminal.print_info(&format!(
        "{} files checked, {} invalid",
        files.len(),
        invalid
    ))?;
    Ok(exit_code(invalid == 0))
}

/// Files as given; directories expanded through discovery.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(RuleLoader::new(path).discover()?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}
