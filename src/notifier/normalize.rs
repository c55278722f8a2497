//! # Settings Normalization
//!
//! Grafana echoes unset optional settings back as empty strings instead of
//! omitting them (<https://github.com/grafana/grafana/issues/55139>). Those
//! are pruned on the way in and on the way out, and every remaining value is
//! rendered as a stable string for the generic `settings` map.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Drop settings whose value is an empty string or null
pub fn prune_empty_settings(settings: &mut Map<String, Value>) {
    settings.retain(|_, value| !is_empty_setting(value));
}

fn is_empty_setting(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Canonical string form of a backend value.
///
/// Strings are kept verbatim; every other value is rendered as compact JSON
/// (`1`, `true`, `["a","b"]`), so the same remote value always yields the same string.
#[must_use]
pub fn setting_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize the residual backend settings into the declared `settings` map
#[must_use]
pub fn pack_settings(settings: &Map<String, Value>) -> BTreeMap<String, String> {
    settings
        .iter()
        .filter(|(_, value)| !is_empty_setting(value))
        .map(|(key, value)| (key.clone(), setting_to_string(value)))
        .collect()
}
