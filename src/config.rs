//! # Provisioner Configuration
//!
//! Process-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_MS, DEFAULT_BACKOFF_START_MS, DEFAULT_CREATE_RETRY_BUDGET_SECS,
    DEFAULT_GRAFANA_URL, DEFAULT_REQUEST_TIMEOUT_SECS, FIRST_ORG_ID,
};
use std::fmt;
use std::time::Duration;

/// Provisioner configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Clone)]
pub struct ProvisionerConfig {
    /// Grafana base URL, e.g. `https://grafana.example.com`
    pub grafana_url: String,
    /// Either `user:password` (basic auth) or an API token (bearer auth)
    pub auth: Option<String>,
    /// Organization used when neither the identifier nor the config names one
    pub org_id: i64,
    /// Wall-clock budget for retrying transient create failures (seconds)
    pub create_retry_budget_secs: u64,
    /// Fibonacci backoff starting value (milliseconds)
    pub backoff_start_ms: u64,
    /// Fibonacci backoff maximum value (milliseconds)
    pub backoff_max_ms: u64,
    /// Per-request HTTP timeout (seconds)
    pub request_timeout_secs: u64,
    /// Fallback log level when `RUST_LOG` is not set
    pub log_level: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
}

impl fmt::Debug for ProvisionerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionerConfig")
            .field("grafana_url", &self.grafana_url)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("org_id", &self.org_id)
            .field("create_retry_budget_secs", &self.create_retry_budget_secs)
            .field("backoff_start_ms", &self.backoff_start_ms)
            .field("backoff_max_ms", &self.backoff_max_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            grafana_url: DEFAULT_GRAFANA_URL.to_string(),
            auth: None,
            org_id: FIRST_ORG_ID,
            create_retry_budget_secs: DEFAULT_CREATE_RETRY_BUDGET_SECS,
            backoff_start_ms: DEFAULT_BACKOFF_START_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "info".to_string(),
            log_enable_color: false,
        }
    }
}

impl ProvisionerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            grafana_url: env_var_or_default_str("GRAFANA_URL", DEFAULT_GRAFANA_URL),
            auth: std::env::var("GRAFANA_AUTH").ok().filter(|v| !v.is_empty()),
            org_id: env_var_or_default("GRAFANA_ORG_ID", FIRST_ORG_ID),
            create_retry_budget_secs: env_var_or_default(
                "CREATE_RETRY_BUDGET_SECS",
                DEFAULT_CREATE_RETRY_BUDGET_SECS,
            ),
            backoff_start_ms: env_var_or_default("BACKOFF_START_MS", DEFAULT_BACKOFF_START_MS),
            backoff_max_ms: env_var_or_default("BACKOFF_MAX_MS", DEFAULT_BACKOFF_MAX_MS),
            request_timeout_secs: env_var_or_default(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            log_level: env_var_or_default_str("LOG_LEVEL", "info"),
            log_enable_color: env_var_or_default_bool("LOG_ENABLE_COLOR", false),
        }
    }

    /// Get the create retry budget as a duration
    #[must_use]
    pub fn create_retry_budget(&self) -> Duration {
        Duration::from_secs(self.create_retry_budget_secs)
    }

    /// Get the backoff starting value as a duration
    #[must_use]
    pub fn backoff_start(&self) -> Duration {
        Duration::from_millis(self.backoff_start_ms)
    }

    /// Get the backoff cap as a duration
    #[must_use]
    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Get the HTTP request timeout as a duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_var_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
