//! # Backend Models
//!
//! JSON payloads exchanged with the Grafana alerting provisioning API.
//!
//! API Reference: <https://grafana.com/docs/grafana/latest/developers/http_api/alerting_provisioning/>

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One notifier record of a contact point (`EmbeddedContactPoint` in the API).
///
/// Several records share a `name`; together they form one logical contact point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    /// Server-assigned identifier, empty until the record is created
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    pub name: String,
    /// Backend discriminator, e.g. `email` or `prometheus-alertmanager`
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub disable_resolve_message: bool,
}

/// A named, reusable schedule during which notifications are suppressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteTiming {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_intervals: Vec<TimeInterval>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<TimeRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_month: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<String>>,
    /// IANA time zone name, e.g. `America/New_York`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
}

/// Start/end of a muted range within a day, in `hh:mm` form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: String,
    pub end_time: String,
}
