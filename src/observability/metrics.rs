//! # Metrics
//!
//! Prometheus metrics for monitoring the provisioner.
//!
//! ## Metrics Exposed
//!
//! - `alerting_provisioner_api_requests_total` - Alerting API calls by operation and outcome
//! - `alerting_provisioner_reconciliations_total` - Reconciliations by resource, action and result
//! - `alerting_provisioner_reconciliation_duration_seconds` - Duration of reconciliations
//! - `alerting_provisioner_create_retries_total` - Create calls retried after a transient failure

use anyhow::Result;
use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static API_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alerting_provisioner_api_requests_total",
            "Total number of alerting API requests by operation and outcome",
        ),
        &["operation", "outcome"],
    )
    .expect("Failed to create API_REQUESTS_TOTAL metric - this should never happen")
});

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "alerting_provisioner_reconciliations_total",
            "Total number of reconciliations by resource, action and result",
        ),
        &["resource", "action", "result"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "alerting_provisioner_reconciliation_duration_seconds",
            "Duration of reconciliations in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 120.0]),
        &["resource"],
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static CREATE_RETRIES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "alerting_provisioner_create_retries_total",
        "Total number of create calls retried after a transient backend failure",
    )
    .expect("Failed to create CREATE_RETRIES_TOTAL metric - this should never happen")
});

/// Register all metrics with the process registry
///
/// # Errors
/// Returns an error if a metric is registered twice
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(API_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CREATE_RETRIES_TOTAL.clone()))?;

    Ok(())
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails
pub fn gather_text() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// `outcome` is one of `success`, `not_found`, `error`
pub fn record_api_request(operation: &str, outcome: &str) {
    API_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_reconciliation(resource: &str, action: &str, success: bool, duration: f64) {
    let result = if success { "success" } else { "error" };
    RECONCILIATIONS_TOTAL
        .with_label_values(&[resource, action, result])
        .inc();
    RECONCILIATION_DURATION
        .with_label_values(&[resource])
        .observe(duration);
}

pub fn increment_create_retries() {
    CREATE_RETRIES_TOTAL.inc();
}
