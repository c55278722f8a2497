//! Alerting Provisioner Library
//!
//! Declarative management of Grafana alerting contact points and mute
//! timings: notifier codecs, the notifier registry and the reconciliation
//! engine that drives a Grafana instance to the declared state.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod models;
pub mod mute_timing;
pub mod notifier;
pub mod observability;
pub mod reconciler;
pub mod state;

pub use client::{AlertingApi, ApiError, GrafanaRestClient};
pub use config::ProvisionerConfig;
pub use error::ProvisionError;
pub use notifier::NotifierRegistry;
pub use reconciler::{ReconcileSettings, Reconciler};
pub use state::{ContactPointConfig, MuteTimingConfig, NotifierInstance, ReadOutcome};
