//! # Constants
//!
//! Shared constants used throughout the provisioner.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// The organization Grafana creates on first start.
/// Its alerting subsystem is provisioned synchronously, every other org's is not.
pub const FIRST_ORG_ID: i64 = 1;

/// Default Grafana base URL
pub const DEFAULT_GRAFANA_URL: &str = "http://localhost:3000";

/// Default wall-clock budget for retrying transient create failures (seconds)
pub const DEFAULT_CREATE_RETRY_BUDGET_SECS: u64 = 120;

/// Default Fibonacci backoff starting value (milliseconds)
pub const DEFAULT_BACKOFF_START_MS: u64 = 500;

/// Default Fibonacci backoff maximum value (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 10_000;

/// Default per-request HTTP timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Separator of the deprecated UID-list identifier (`uid1;uid2;uid3`)
pub const LEGACY_UID_SEPARATOR: char = ';';

/// Separator between org id and name in resource identifiers (`1:my-contact-point`)
pub const ORG_RESOURCE_ID_SEPARATOR: char = ':';

/// Base path of the alerting provisioning HTTP API
pub const PROVISIONING_API_PATH: &str = "api/v1/provisioning";
