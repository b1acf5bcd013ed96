use std::env;
use std::fmt;

/// Public Log Analytics query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.loganalytics.io";

const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

// ── Env helpers (mirrors hunt-core config, kept local so the client has no config dep) ──

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── LogAnalyticsConfig ─────────────────────────────────────────────

/// Connection settings for the Log Analytics query API.
///
/// Reads from environment variables with optional profile prefix.
/// When `HUNT_PROFILE=PROD`, checks `PROD_LOG_ANALYTICS_TOKEN` before
/// `LOG_ANALYTICS_TOKEN`.
#[derive(Clone)]
pub struct LogAnalyticsConfig {
    /// Base URL, without trailing slash.
    pub endpoint: String,
    /// Pre-issued bearer token. Token acquisition happens outside this crate.
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl LogAnalyticsConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        let profile = env_opt("HUNT_PROFILE")
            .map(|s| s.to_uppercase())
            .unwrap_or_default();
        Self::from_env_profiled(&profile)
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        let endpoint = profiled_env_opt(profile, "LOG_ANALYTICS_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: profiled_env_opt(profile, "LOG_ANALYTICS_TOKEN"),
            timeout_seconds: profiled_env_u64(
                profile,
                "LOG_ANALYTICS_TIMEOUT_SECONDS",
                DEFAULT_TIMEOUT_SECONDS,
            ),
        }
    }

    /// Query URL for a workspace.
    pub fn query_url(&self, workspace_id: &str) -> String {
        format!("{}/v1/workspaces/{}/query", self.endpoint, workspace_id)
    }
}

impl Default for LogAnalyticsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl fmt::Debug for LogAnalyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogAnalyticsConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
