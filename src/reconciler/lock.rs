//! # Provisioning Lock
//!
//! Grafana's alerting provisioning API is not safe under concurrent writes,
//! so every contact point and mute timing operation against one backend
//! organization runs under a single process-wide lock.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::debug;

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

static ALERTING_LOCKS: LazyLock<LockTable> = LazyLock::new(|| Mutex::new(HashMap::new()));

fn lock_key(endpoint: &str, org_id: i64) -> String {
    format!("{endpoint}/{org_id}")
}

fn alerting_lock(key: &str) -> Arc<tokio::sync::Mutex<()>> {
    // A panic while holding the table lock cannot leave the map half-updated
    let mut locks = ALERTING_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key.to_string()).or_default())
}

/// Run `operation` while holding the alerting lock of `endpoint`/`org_id`.
///
/// The lock is released when the operation finishes, fails, panics or is dropped.
pub async fn with_alerting_mutex<F, T>(endpoint: &str, org_id: i64, operation: F) -> T
where
    F: Future<Output = T>,
{
    let key = lock_key(endpoint, org_id);
    let lock = alerting_lock(&key);
    let _guard = lock.lock().await;
    debug!("Acquired alerting provisioning lock {}", key);
    operation.await
}
