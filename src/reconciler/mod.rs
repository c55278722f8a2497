//! # Reconciler
//!
//! Drives declared contact points and mute timings to the state of the
//! remote alerting backend.
//!
//! ## Contact Point Flow
//!
//! 1. **Unpacking**: validate the declared contact point and derive one backend record per notifier
//! 2. **Fetching current**: list the records sharing the contact point's name (skipped on create)
//! 3. **Applying**: update records that carry a UID, create the rest (retrying transient
//!    failures in non-default orgs), then delete current records nobody claimed
//! 4. **Reading**: list the records again and fold them back into the declared shape
//!
//! Every operation runs under the provisioning lock of its backend organization.

pub mod backoff;
mod contact_point;
pub mod lock;
mod mute_timing;
pub mod retry;

pub use lock::with_alerting_mutex;

use crate::client::{AlertingApi, ApiError};
use crate::config::ProvisionerConfig;
use crate::constants::FIRST_ORG_ID;
use crate::notifier::NotifierRegistry;
use crate::observability::metrics;
use crate::reconciler::retry::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Engine tuning, usually derived from [`ProvisionerConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Organization used when a resource does not name one
    pub default_org_id: i64,
    pub create_retry_budget: Duration,
    pub backoff_start: Duration,
    pub backoff_max: Duration,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self::from(&ProvisionerConfig::default())
    }
}

impl From<&ProvisionerConfig> for ReconcileSettings {
    fn from(config: &ProvisionerConfig) -> Self {
        Self {
            default_org_id: config.org_id,
            create_retry_budget: config.create_retry_budget(),
            backoff_start: config.backoff_start(),
            backoff_max: config.backoff_max(),
        }
    }
}

impl ReconcileSettings {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            budget: self.create_retry_budget,
            backoff_start: self.backoff_start,
            backoff_max: self.backoff_max,
        }
    }
}

/// Stage of a contact point reconciliation, reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Unpacking,
    FetchingCurrent,
    Applying,
    Reading,
    Done,
    Failed,
}

impl ReconcilePhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReconcilePhase::Unpacking => "Unpacking",
            ReconcilePhase::FetchingCurrent => "FetchingCurrent",
            ReconcilePhase::Applying => "Applying",
            ReconcilePhase::Reading => "Reading",
            ReconcilePhase::Done => "Done",
            ReconcilePhase::Failed => "Failed",
        }
    }
}

pub struct Reconciler {
    api: Arc<dyn AlertingApi>,
    settings: ReconcileSettings,
    registry: &'static NotifierRegistry,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("endpoint", &self.api.endpoint())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(api: Arc<dyn AlertingApi>, settings: ReconcileSettings) -> Self {
        Self {
            api,
            settings,
            registry: NotifierRegistry::global(),
            cancel: CancellationToken::new(),
        }
    }

    /// Abort retry waits when `cancel` fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    #[must_use]
    pub fn registry(&self) -> &'static NotifierRegistry {
        self.registry
    }

    fn org_id(&self, declared: Option<i64>) -> i64 {
        declared.unwrap_or(self.settings.default_org_id)
    }

    /// Grafana provisions the alertmanager of every org but the first
    /// asynchronously and answers 500 until it is ready
    fn is_transient_create_error(org_id: i64, err: &ApiError) -> bool {
        org_id > FIRST_ORG_ID && err.is_internal_error()
    }

    async fn locked<F, T>(&self, org_id: i64, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        with_alerting_mutex(self.api.endpoint(), org_id, operation).await
    }
}

fn log_phase(name: &str, phase: ReconcilePhase) {
    debug!("Contact point {}: {}", name, phase.as_str());
}

/// Await one API call, counting it by operation and outcome
async fn observed<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    let result = call.await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(err) if err.is_not_found() => "not_found",
        Err(_) => "error",
    };
    metrics::record_api_request(operation, outcome);
    result
}

/// Await a whole reconciliation, recording its duration and result
async fn timed<T, E>(
    resource: &'static str,
    action: &'static str,
    operation: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let started = std::time::Instant::now();
    let result = operation.await;
    metrics::record_reconciliation(
        resource,
        action,
        result.is_ok(),
        started.elapsed().as_secs_f64(),
    );
    result
}
