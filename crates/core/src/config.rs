use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StartupError;

/// Default investigation config, relative to the working directory.
pub const DEFAULT_INVESTIGATION_CONFIG: &str = "investigations/example-case/config.yaml";

/// Default discovery root for rule documents.
pub const DEFAULT_QUERIES_ROOT: &str = "queries";

pub const WORKSPACE_ID_KEY: &str = "SENTINEL_WORKSPACE_ID";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_list(profile: &str, key: &str) -> Vec<String> {
    profiled_env_opt(profile, key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ── Output format ─────────────────────────────────────────────

/// Tabular file format used when persisting query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// File extension (without the dot) for result files.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!("expected 'csv' or 'parquet', got '{other}'")),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Process-level settings, read once at startup.
///
/// Profile is read from `HUNT_PROFILE`. When set (e.g. `PROD`), every key is
/// first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Log Analytics workspace the queries run against.
    pub workspace_id: Option<String>,
    pub investigation_config_path: PathBuf,
    pub investigation_root: PathBuf,
    pub results_root: PathBuf,
    pub queries_root: PathBuf,
    /// ISO-8601 duration handed to the executor, e.g. `P7D`.
    pub timespan: Option<String>,
    pub output_format: OutputFormat,
    /// Keys that must be present and non-empty in the investigation config.
    pub required_keys: Vec<String>,
}

impl HuntConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, StartupError> {
        let profile = env_opt("HUNT_PROFILE").unwrap_or_default().to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, StartupError> {
        let p = profile.to_uppercase();
        let p = p.as_str();

        let investigation_config_path = PathBuf::from(profiled_env_or(
            p,
            "INVESTIGATION_CONFIG_PATH",
            DEFAULT_INVESTIGATION_CONFIG,
        ));

        // An explicit INVESTIGATION_PATH wins over the config file's directory.
        let investigation_root = profiled_env_opt(p, "INVESTIGATION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| parent_or_current(&investigation_config_path));

        let results_root = profiled_env_opt(p, "INVESTIGATION_RESULTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| investigation_root.join("results"));

        let output_format = match profiled_env_opt(p, "OUTPUT_FORMAT") {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map_err(|reason| StartupError::InvalidEnv {
                    key: "OUTPUT_FORMAT",
                    value: raw.clone(),
                    reason,
                })?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            profile: p.to_string(),
            workspace_id: profiled_env_opt(p, WORKSPACE_ID_KEY),
            investigation_config_path,
            investigation_root,
            results_root,
            queries_root: PathBuf::from(profiled_env_or(p, "QUERIES_ROOT", DEFAULT_QUERIES_ROOT)),
            timespan: profiled_env_opt(p, "QUERY_TIMESPAN"),
            output_format,
            required_keys: profiled_env_list(p, "REQUIRED_CONFIG_KEYS"),
        })
    }

    /// The workspace id, or the fatal startup error when it is absent.
    pub fn require_workspace_id(&self) -> Result<&str, StartupError> {
        self.workspace_id
            .as_deref()
            .ok_or(StartupError::MissingEnv(WORKSPACE_ID_KEY))
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  workspace:   {}", self.workspace_id.as_deref().unwrap_or("(none)"));
        tracing::info!("  config:      {}", self.investigation_config_path.display());
        tracing::info!("  queries:     {}", self.queries_root.display());
        tracing::info!("  results:     {} ({})", self.results_root.display(), self.output_format);
        tracing::info!("  timespan:    {}", self.timespan.as_deref().unwrap_or("(query-defined)"));
    }
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-based tests must run serially to avoid interfering with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_hunt_env() {
        let keys = [
            "HUNT_PROFILE",
            "SENTINEL_WORKSPACE_ID",
            "INVESTIGATION_CONFIG_PATH",
            "INVESTIGATION_PATH",
            "INVESTIGATION_RESULTS_PATH",
            "QUERIES_ROOT",
            "QUERY_TIMESPAN",
            "OUTPUT_FORMAT",
            "REQUIRED_CONFIG_KEYS",
            "CASE7_SENTINEL_WORKSPACE_ID",
            "CASE7_OUTPUT_FORMAT",
        ];
        for k in keys {
            env::remove_var(k);
        }
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_hunt_env();

        let cfg = HuntConfig::from_env().unwrap();
        assert_eq!(cfg.profile_label(), "default");
        assert!(cfg.workspace_id.is_none());
        assert_eq!(
            cfg.investigation_config_path,
            PathBuf::from(DEFAULT_INVESTIGATION_CONFIG)
        );
        assert_eq!(cfg.investigation_root, PathBuf::from("investigations/example-case"));
        assert_eq!(
            cfg.results_root,
            PathBuf::from("investigations/example-case/results")
        );
        assert_eq!(cfg.queries_root, PathBuf::from("queries"));
        assert_eq!(cfg.output_format, OutputFormat::Csv);
        assert!(cfg.required_keys.is_empty());
    }

    #[test]
    fn missing_workspace_is_a_startup_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_hunt_env();

        let cfg = HuntConfig::from_env().unwrap();
        let err = cfg.require_workspace_id().unwrap_err();
        assert_eq!(
            err.to_string(),
            "SENTINEL_WORKSPACE_ID environment variable is not set."
        );
    }

    #[test]
    fn investigation_path_overrides_config_parent() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_hunt_env();

        env::set_var("INVESTIGATION_CONFIG_PATH", "cases/a/config.yaml");
        env::set_var("INVESTIGATION_PATH", "investigations/rtbt");
        let cfg = HuntConfig::from_env().unwrap();
        assert_eq!(cfg.investigation_root, PathBuf::from("investigations/rtbt"));
        assert_eq!(cfg.results_root, PathBuf::from("investigations/rtbt/results"));

        env::set_var("INVESTIGATION_RESULTS_PATH", "/tmp/out");
        let cfg = HuntConfig::from_env().unwrap();
        assert_eq!(cfg.results_root, PathBuf::from("/tmp/out"));

        clear_hunt_env();
    }

    #[test]
    fn profile_prefix_takes_precedence() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_hunt_env();

        env::set_var("HUNT_PROFILE", "case7");
        env::set_var("SENTINEL_WORKSPACE_ID", "base-ws");
        env::set_var("CASE7_SENTINEL_WORKSPACE_ID", "case7-ws");
        env::set_var("CASE7_OUTPUT_FORMAT", "Parquet");

        let cfg = HuntConfig::from_env().unwrap();
        assert_eq!(cfg.profile, "CASE7");
        assert_eq!(cfg.require_workspace_id().unwrap(), "case7-ws");
        assert_eq!(cfg.output_format, OutputFormat::Parquet);

        clear_hunt_env();
    }

    #[test]
    fn invalid_output_format_is_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_hunt_env();

        env::set_var("OUTPUT_FORMAT", "xlsx");
        let err = HuntConfig::from_env().unwrap_err();
        assert!(matches!(err, StartupError::InvalidEnv { key: "OUTPUT_FORMAT", .. }));

        clear_hunt_env();
    }

    #[test]
    fn required_keys_are_split_and_trimmed() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_hunt_env();

        env::set_var("REQUIRED_CONFIG_KEYS", "device_name, user_name,,start_time");
        let cfg = HuntConfig::from_env().unwrap();
        assert_eq!(cfg.required_keys, vec!["device_name", "user_name", "start_time"]);

        clear_hunt_env();
    }

    #[test]
    fn bare_file_name_resolves_to_current_dir() {
        assert_eq!(parent_or_current(Path::new("config.yaml")), PathBuf::from("."));
    }
}
