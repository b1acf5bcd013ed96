use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use hunt_pipeline::RunSummary;
use hunt_rules::ValidationResult;
use serde_yaml::Value;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PASS: Color = Color::Green;
    const FAIL: Color = Color::Red;
    const WARN: Color = Color::Yellow;
    const HEADER: Color = Color::Magenta;
    const DIM: Color = Color::DarkGrey;
}

const RULE_WIDTH: usize = 70;

/// Colored report output for the `hunt` subcommands.
///
/// Progress and diagnostics go through `tracing`; this is for the results a
/// user asked to see.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// `=====` / title / `=====`.
    pub fn print_section(&self, title: &str) -> Result<()> {
        let mut stdout = io::stdout();
        let rule = "=".repeat(RULE_WIDTH);
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{rule}\n{title}\n{rule}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Closing rule for a section.
    pub fn print_rule(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", "=".repeat(RULE_WIDTH))),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// `[TAG] PASSED` in green or `[TAG] FAILED` in red.
    pub fn print_status(&self, tag: &str, ok: bool) -> Result<()> {
        let mut stdout = io::stdout();
        let (color, label) = if ok { (Colors::PASS, "PASSED") } else { (Colors::FAIL, "FAILED") };
        execute!(
            stdout,
            Print(format!("[{tag}] ")),
            SetForegroundColor(color),
            Print(format!("{label}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_line(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(format!("{msg}\n")))?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::FAIL),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_warning(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::WARN),
            Print(format!("Warning: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// One validated file: status line, then errors and warnings.
    pub fn print_validation(&self, path: &Path, result: &ValidationResult) -> Result<()> {
        self.print_status(&path.display().to_string(), result.valid)?;
        for error in &result.errors {
            self.print_error(&format!("{}: {}", error.path, error))?;
        }
        for warning in &result.warnings {
            self.print_warning(&format!("{}: {}", warning.path, warning.message))?;
        }
        Ok(())
    }

    /// Query metadata block for `render`.
    pub fn print_metadata(&self, raw: &Value) -> Result<()> {
        self.print_section("QUERY METADATA:")?;
        for line in metadata_lines(raw) {
            self.print_line(&line)?;
        }
        self.print_rule()
    }

    /// Totals plus one line per failure.
    pub fn print_summary(&self, summary: &RunSummary) -> Result<()> {
        self.print_section("SUMMARY")?;
        self.print_line(&format!("Total files processed: {}", summary.total))?;

        self.print_line(&format!("Executed: {}", summary.executed))?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::PASS),
            Print(format!("Persisted: {}\n", summary.persisted)),
            SetForegroundColor(if summary.failed > 0 { Colors::FAIL } else { Colors::DIM }),
            Print(format!("Failed runs: {}\n", summary.failed)),
            ResetColor,
        )?;
        for (path, error) in summary.failures() {
            execute!(
                stdout,
                SetForegroundColor(Colors::FAIL),
                Print(format!("  - {}: {}\n", path.display(), error)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        self.print_info(&format!("Completed at {}", summary.completed_at.to_rfc3339()))
    }
}

fn text<'a>(raw: &'a Value, key: &str) -> &'a str {
    raw.get(key).and_then(Value::as_str).unwrap_or("N/A")
}

/// Human-readable metadata lines. Absent fields show as `N/A`; absent
/// sections are skipped.
pub fn metadata_lines(raw: &Value) -> Vec<String> {
    let mut lines = vec![
        format!("Title: {}", text(raw, "title")),
        format!("ID: {}", text(raw, "id")),
        format!("Author: {}", text(raw, "author")),
        format!("Status: {}", text(raw, "status")),
        format!("Level: {}", text(raw, "level")),
    ];

    if let Some(tags) = raw.get("tags").and_then(Value::as_sequence) {
        let tags: Vec<&str> = tags.iter().filter_map(Value::as_str).collect();
        if !tags.is_empty() {
            lines.push(format!("Tags: {}", tags.join(", ")));
        }
    }

    if let Some(description) = raw.get("description").and_then(Value::as_str) {
        lines.push(String::new());
        lines.push("Description:".to_string());
        lines.push(format!("  {}", description.trim_end()));
    }

    if let Some(logsource) = raw.get("logsource").filter(|v| v.is_mapping()) {
        lines.push(String::new());
        lines.push("Log Source:".to_string());
        for (key, label) in [("product", "Product"), ("table", "Table"), ("category", "Category")] {
            if let Some(value) = logsource.get(key).and_then(Value::as_str) {
                lines.push(format!("  {label}: {value}"));
            }
        }
    }
    lines
}
