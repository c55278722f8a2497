//! # Alerting API Client
//!
//! Boundary to the remote alerting backend. One call performs one logical
//! operation and reports success, a structured not-found, or a failure.
//! Authentication, transport and pagination live behind this trait.

use crate::models::{ContactPoint, MuteTiming};
use async_trait::async_trait;
use thiserror::Error;

pub mod rest;

pub use rest::GrafanaRestClient;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_)) || self.status_code() == Some(404)
    }

    /// HTTP 500, what Grafana answers while an org's alertmanager is still being provisioned
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        self.status_code() == Some(500)
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            ApiError::Transport(err) => err.status().map(|status| status.as_u16()),
            ApiError::NotFound(_) | ApiError::Decode(_) => None,
        }
    }
}

/// Alerting provisioning operations, scoped per organization
#[async_trait]
pub trait AlertingApi: Send + Sync {
    /// Identifies the backend; provisioning locks are keyed by it
    fn endpoint(&self) -> &str;

    /// List notifier records, optionally only those of one contact point
    async fn list_contact_points(
        &self,
        org_id: i64,
        name: Option<&str>,
    ) -> Result<Vec<ContactPoint>, ApiError>;

    /// Create a notifier record; the response carries the assigned UID
    async fn create_contact_point(
        &self,
        org_id: i64,
        point: &ContactPoint,
    ) -> Result<ContactPoint, ApiError>;

    async fn update_contact_point(
        &self,
        org_id: i64,
        uid: &str,
        point: &ContactPoint,
    ) -> Result<(), ApiError>;

    async fn delete_contact_point(&self, org_id: i64, uid: &str) -> Result<(), ApiError>;

    async fn get_mute_timing(&self, org_id: i64, name: &str) -> Result<MuteTiming, ApiError>;

    async fn create_mute_timing(
        &self,
        org_id: i64,
        timing: &MuteTiming,
    ) -> Result<MuteTiming, ApiError>;

    /// Full replace, keyed by name
    async fn update_mute_timing(
        &self,
        org_id: i64,
        name: &str,
        timing: &MuteTiming,
    ) -> Result<MuteTiming, ApiError>;

    async fn delete_mute_timing(&self, org_id: i64, name: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let internal = ApiError::Status {
            code: 500,
            message: "alertmanager not ready".to_string(),
        };
        assert!(internal.is_internal_error());
        assert!(!internal.is_not_found());

        let missing = ApiError::NotFound("mute timing weekends".to_string());
        assert!(missing.is_not_found());
        assert!(!missing.is_internal_error());

        let status_404 = ApiError::Status {
            code: 404,
            message: String::new(),
        };
        assert!(status_404.is_not_found());
    }
}
