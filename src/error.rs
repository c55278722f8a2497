//! # Errors
//!
//! Failure taxonomy of the reconciliation engine. Every variant carries the
//! resource name and, where one exists, the notifier UID.

use crate::client::ApiError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to {operation} {resource} {name}: {source}")]
    Api {
        operation: &'static str,
        resource: &'static str,
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to update contact point notifier with UID {uid} in contact point {name}: {source}")]
    UpdateNotifier {
        uid: String,
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to remove contact point notifier with UID {uid} from contact point {name}: {source}")]
    RemoveNotifier {
        uid: String,
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("creating {notifier} notifier in contact point {name} still failing after {attempts} attempts over {elapsed:?}: {source}")]
    RetryExhausted {
        notifier: String,
        name: String,
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: ApiError,
    },

    #[error("operation on {name} was cancelled")]
    Cancelled { name: String },

    #[error("contact point with UID {uid} has a different name ({name}) than the contact point with UID {first_uid} ({first_name})")]
    InconsistentImport {
        uid: String,
        name: String,
        first_uid: String,
        first_name: String,
    },

    #[error("contact point with UID {uid} was not found")]
    ImportUidNotFound { uid: String },

    #[error("{resource} {id} was not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} {name} was not found after it was applied")]
    MissingAfterApply {
        resource: &'static str,
        name: String,
    },

    #[error("invalid configuration for {resource} {name}: {reason}")]
    InvalidConfig {
        resource: &'static str,
        name: String,
        reason: String,
    },

    #[error("invalid resource identifier {0:?}")]
    InvalidId(String),
}

impl ProvisionError {
    pub(crate) fn invalid_contact_point(name: &str, reason: impl Into<String>) -> Self {
        ProvisionError::InvalidConfig {
            resource: "contact point",
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
