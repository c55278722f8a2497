//! Common test utilities for reconciliation tests
//!
//! Provides an in-memory alerting backend that behaves like Grafana's
//! provisioning API closely enough for the engine: it assigns UIDs, redacts
//! secure settings on read and can be told to fail creates or deletes.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use alerting_provisioner::client::{AlertingApi, ApiError};
use alerting_provisioner::models::{ContactPoint, MuteTiming};
use alerting_provisioner::reconciler::{ReconcileSettings, Reconciler};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Settings Grafana never echoes back
const REDACTED_KEYS: &[&str] = &["password", "authorization_credentials"];
pub const REDACTED: &str = "[REDACTED]";

static ENDPOINT_SEQ: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Default)]
struct FakeState {
    points: Vec<(i64, ContactPoint)>,
    mute_timings: Vec<(i64, MuteTiming)>,
    next_uid: usize,
    create_failures: u32,
    fail_deletes: bool,
    calls: Vec<String>,
}

#[derive(Debug)]
pub struct FakeAlertingApi {
    endpoint: String,
    state: Mutex<FakeState>,
}

impl FakeAlertingApi {
    /// Each fake gets its own endpoint so tests never share a provisioning lock
    pub fn new() -> Arc<Self> {
        let seq = ENDPOINT_SEQ.fetch_add(1, Ordering::SeqCst);
        Arc::new(Self {
            endpoint: format!("http://fake-grafana-{seq}"),
            state: Mutex::new(FakeState::default()),
        })
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Answer the next `count` create calls with HTTP 500
    pub fn fail_creates(&self, count: u32) {
        self.state().create_failures = count;
    }

    pub fn fail_deletes(&self) {
        self.state().fail_deletes = true;
    }

    /// Store a record directly, as if it had been created out of band
    pub fn seed(&self, org_id: i64, point: ContactPoint) {
        self.state().points.push((org_id, point));
    }

    pub fn seed_mute_timing(&self, org_id: i64, timing: MuteTiming) {
        self.state().mute_timings.push((org_id, timing));
    }

    /// Stored records of one org, secrets included
    pub fn records(&self, org_id: i64) -> Vec<ContactPoint> {
        self.state()
            .points
            .iter()
            .filter(|(org, _)| *org == org_id)
            .map(|(_, point)| point.clone())
            .collect()
    }

    pub fn mute_timing(&self, org_id: i64, name: &str) -> Option<MuteTiming> {
        self.state()
            .mute_timings
            .iter()
            .find(|(org, timing)| *org == org_id && timing.name == name)
            .map(|(_, timing)| timing.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Recorded calls whose name starts with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn log_call(&self, call: String) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

fn redacted(point: &ContactPoint) -> ContactPoint {
    let mut point = point.clone();
    for key in REDACTED_KEYS {
        if let Some(value) = point.settings.get_mut(*key) {
            *value = Value::String(REDACTED.to_string());
        }
    }
    point
}

fn internal_error() -> ApiError {
    ApiError::Status {
        code: 500,
        message: "alertmanager is not ready".to_string(),
    }
}

#[async_trait]
impl AlertingApi for FakeAlertingApi {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list_contact_points(
        &self,
        org_id: i64,
        name: Option<&str>,
    ) -> Result<Vec<ContactPoint>, ApiError> {
        let state = self.log_call(format!("list:{}", name.unwrap_or("*")));
        Ok(state
            .points
            .iter()
            .filter(|(org, point)| *org == org_id && name.map_or(true, |name| point.name == name))
            .map(|(_, point)| redacted(point))
            .collect())
    }

    async fn create_contact_point(
        &self,
        org_id: i64,
        point: &ContactPoint,
    ) -> Result<ContactPoint, ApiError> {
        let mut state = self.log_call(format!("create:{}", point.type_tag));
        if state.create_failures > 0 {
            state.create_failures -= 1;
            return Err(internal_error());
        }

        let mut stored = point.clone();
        if stored.uid.is_empty() {
            state.next_uid += 1;
            stored.uid = format!("uid-{}", state.next_uid);
        }
        state.points.push((org_id, stored.clone()));
        Ok(redacted(&stored))
    }

    async fn update_contact_point(
        &self,
        org_id: i64,
        uid: &str,
        point: &ContactPoint,
    ) -> Result<(), ApiError> {
        let mut state = self.log_call(format!("update:{uid}"));
        let Some((_, stored)) = state
            .points
            .iter_mut()
            .find(|(org, stored)| *org == org_id && stored.uid == uid)
        else {
            return Err(ApiError::NotFound(format!("contact point {uid}")));
        };
        *stored = ContactPoint {
            uid: uid.to_string(),
            ..point.clone()
        };
        Ok(())
    }

    async fn delete_contact_point(&self, org_id: i64, uid: &str) -> Result<(), ApiError> {
        let mut state = self.log_call(format!("delete:{uid}"));
        if state.fail_deletes {
            return Err(internal_error());
        }
        let before = state.points.len();
        state
            .points
            .retain(|(org, stored)| !(*org == org_id && stored.uid == uid));
        if state.points.len() == before {
            return Err(ApiError::NotFound(format!("contact point {uid}")));
        }
        Ok(())
    }

    async fn get_mute_timing(&self, org_id: i64, name: &str) -> Result<MuteTiming, ApiError> {
        let state = self.log_call(format!("get_mute_timing:{name}"));
        state
            .mute_timings
            .iter()
            .find(|(org, timing)| *org == org_id && timing.name == name)
            .map(|(_, timing)| timing.clone())
            .ok_or_else(|| ApiError::NotFound(format!("mute timing {name}")))
    }

    async fn create_mute_timing(
        &self,
        org_id: i64,
        timing: &MuteTiming,
    ) -> Result<MuteTiming, ApiError> {
        let mut state = self.log_call(format!("create_mute_timing:{}", timing.name));
        if state
            .mute_timings
            .iter()
            .any(|(org, stored)| *org == org_id && stored.name == timing.name)
        {
            return Err(ApiError::Status {
                code: 409,
                message: format!("mute timing {} already exists", timing.name),
            });
        }
        state.mute_timings.push((org_id, timing.clone()));
        Ok(timing.clone())
    }

    async fn update_mute_timing(
        &self,
        org_id: i64,
        name: &str,
        timing: &MuteTiming,
    ) -> Result<MuteTiming, ApiError> {
        let mut state = self.log_call(format!("update_mute_timing:{name}"));
        let Some((_, stored)) = state
            .mute_timings
            .iter_mut()
            .find(|(org, stored)| *org == org_id && stored.name == name)
        else {
            return Err(ApiError::NotFound(format!("mute timing {name}")));
        };
        *stored = timing.clone();
        Ok(timing.clone())
    }

    async fn delete_mute_timing(&self, org_id: i64, name: &str) -> Result<(), ApiError> {
        let mut state = self.log_call(format!("delete_mute_timing:{name}"));
        let before = state.mute_timings.len();
        state
            .mute_timings
            .retain(|(org, stored)| !(*org == org_id && stored.name == name));
        if state.mute_timings.len() == before {
            return Err(ApiError::NotFound(format!("mute timing {name}")));
        }
        Ok(())
    }
}

pub fn settings() -> ReconcileSettings {
    ReconcileSettings {
        default_org_id: 1,
        create_retry_budget: Duration::from_secs(120),
        backoff_start: Duration::from_millis(500),
        backoff_max: Duration::from_secs(10),
    }
}

pub fn reconciler(api: &Arc<FakeAlertingApi>) -> Reconciler {
    Reconciler::new(Arc::clone(api) as Arc<dyn AlertingApi>, settings())
}

/// A backend record as Grafana would store it
pub fn record(uid: &str, name: &str, type_tag: &str, settings: Value) -> ContactPoint {
    ContactPoint {
        uid: uid.to_string(),
        name: name.to_string(),
        type_tag: type_tag.to_string(),
        settings: settings.as_object().cloned().unwrap_or_default(),
        disable_resolve_message: false,
    }
}
