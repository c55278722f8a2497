//! # Declared State
//!
//! External representation of contact points and mute timings: what a user
//! declares, and the normalized tree the provisioner hands back after a
//! reconciliation.
//!
//! A declared contact point looks like:
//!
//! ```yaml
//! name: ops
//! email:
//!   - addresses: ["oncall@example.com"]
//!     single_email: true
//! slack:
//!   - url: https://hooks.slack.com/services/T000/B000/XXX
//!     settings:
//!       color: danger
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One logical contact point, keyed by notifier group (`email`, `slack`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPointConfig {
    /// Composite `org:name` identifier, set once the contact point exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<i64>,
    pub name: String,
    #[serde(flatten)]
    pub notifiers: BTreeMap<String, Vec<NotifierInstance>>,
}

impl ContactPointConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a notifier instance under the given group
    #[must_use]
    pub fn with_notifier(mut self, field: &str, instance: NotifierInstance) -> Self {
        self.notifiers
            .entry(field.to_string())
            .or_default()
            .push(instance);
        self
    }

    /// Previously declared instance of a group carrying the given UID
    #[must_use]
    pub fn find_notifier(&self, field: &str, uid: &str) -> Option<&NotifierInstance> {
        if uid.is_empty() {
            return None;
        }
        self.notifiers
            .get(field)?
            .iter()
            .find(|instance| instance.uid == uid)
    }

    /// Every declared instance, in group order
    pub fn instances(&self) -> impl Iterator<Item = (&str, &NotifierInstance)> {
        self.notifiers.iter().flat_map(|(field, instances)| {
            instances
                .iter()
                .map(move |instance| (field.as_str(), instance))
        })
    }

    /// Every UID recorded in this tree
    #[must_use]
    pub fn uids(&self) -> Vec<&str> {
        self.instances()
            .map(|(_, instance)| instance.uid.as_str())
            .filter(|uid| !uid.is_empty())
            .collect()
    }
}

/// One configured notifier within a contact point.
///
/// `fields` holds the kind-specific typed fields (`url`, `addresses`, ...);
/// `settings` is the free-form passthrough map.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierInstance {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default)]
    pub disable_resolve_message: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl NotifierInstance {
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_setting(mut self, key: &str, value: impl Into<String>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

// Values may be credentials, only keys are printed.
impl fmt::Debug for NotifierInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierInstance")
            .field("uid", &self.uid)
            .field("disable_resolve_message", &self.disable_resolve_message)
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A declared mute timing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteTimingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intervals: Vec<IntervalConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<TimeRangeConfig>>,
    /// e.g. `monday` or `tuesday:thursday`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<String>>,
    /// e.g. `1`, `14:16` or `-1` for the last day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_month: Option<Vec<String>>,
    /// e.g. `1:3`, `december` or `may:august`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<String>>,
    /// e.g. `2030` or `2025:2026`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// `hh:mm` bounds, start inclusive, end exclusive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeConfig {
    pub start: String,
    pub end: String,
}

/// Result of a top-level read
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Found(T),
    /// The resource no longer exists remotely and should be dropped from tracked state
    Missing,
}

impl<T> ReadOutcome<T> {
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            ReadOutcome::Found(value) => Some(value),
            ReadOutcome::Missing => None,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, ReadOutcome::Missing)
    }
}
