//! # Field Mapping Helpers
//!
//! Moves values between the declared representation of a notifier and the
//! backend `settings` map. Shared by every notifier kind.

use crate::models::ContactPoint;
use crate::notifier::normalize::setting_to_string;
use crate::notifier::schema::{FieldKind, FieldSpec};
use crate::notifier::NotifierMeta;
use crate::state::NotifierInstance;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Backend record carrying the common fields and the raw `settings` passthrough
#[must_use]
pub fn unpack_common_fields(
    meta: &NotifierMeta,
    raw: &NotifierInstance,
    name: &str,
) -> ContactPoint {
    let settings = raw
        .settings
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    ContactPoint {
        uid: raw.uid.clone(),
        name: name.to_string(),
        type_tag: meta.type_tag.to_string(),
        settings,
        disable_resolve_message: raw.disable_resolve_message,
    }
}

/// Copy one declared field into the backend settings, skipping absent values
pub fn unpack_field(spec: &FieldSpec, raw: &NotifierInstance, settings: &mut Map<String, Value>) {
    if let Some(value) = raw.fields.get(spec.key).filter(|value| !value.is_null()) {
        settings.insert(spec.backend_key.to_string(), value.clone());
    }
}

#[must_use]
pub fn pack_common_fields(point: &ContactPoint) -> NotifierInstance {
    NotifierInstance {
        uid: point.uid.clone(),
        disable_resolve_message: point.disable_resolve_message,
        ..NotifierInstance::default()
    }
}

/// Claim one field out of the backend settings.
///
/// Values that cannot be read as the field's type stay in the residual settings.
pub fn pack_field(
    spec: &FieldSpec,
    settings: &mut Map<String, Value>,
    fields: &mut BTreeMap<String, Value>,
) {
    let Some(value) = settings.remove(spec.backend_key) else {
        return;
    };

    match coerce(spec.kind, value) {
        Ok(Some(value)) => {
            fields.insert(spec.key.to_string(), value);
        }
        Ok(None) => {}
        Err(original) => {
            settings.insert(spec.backend_key.to_string(), original);
        }
    }
}

/// Read a backend value as the given kind. `Ok(None)` means "unset".
fn coerce(kind: FieldKind, value: Value) -> Result<Option<Value>, Value> {
    match (kind, value) {
        (_, Value::Null) => Ok(None),
        (FieldKind::String | FieldKind::Integer, Value::String(s)) if s.is_empty() => {
            Ok(None)
        }
        (FieldKind::String, value @ Value::String(_)) => Ok(Some(value)),
        (FieldKind::String, value @ (Value::Number(_) | Value::Bool(_))) => {
            Ok(Some(Value::String(value.to_string())))
        }
        (FieldKind::Bool, value @ Value::Bool(_)) => Ok(Some(value)),
        (FieldKind::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(Some(Value::Bool(true))),
            "false" => Ok(Some(Value::Bool(false))),
            _ => Err(Value::String(s)),
        },
        (FieldKind::Integer, Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Some(Value::from(i))),
            None => Err(Value::Number(n)),
        },
        // Grafana stores some numeric settings as strings, e.g. webhook `maxAlerts`
        (FieldKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Some(Value::from(i))),
            Err(_) => Err(Value::String(s)),
        },
        (FieldKind::StringList, Value::Array(items)) if items.iter().all(Value::is_string) => {
            Ok(Some(Value::Array(items)))
        }
        (FieldKind::StringMap, Value::Object(entries)) => Ok(Some(Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(setting_to_string(value))))
                .collect(),
        ))),
        (_, other) => Err(other),
    }
}

/// Take secure fields from the previously declared instance.
///
/// Grafana never echoes secrets, so whatever came back for these keys is
/// replaced by the declared value when there is one.
pub fn pack_secure_fields(
    fields: &mut BTreeMap<String, Value>,
    prior: Option<&NotifierInstance>,
    secure_fields: &[&str],
) {
    let Some(prior) = prior else {
        return;
    };

    for key in secure_fields {
        if let Some(value) = prior.fields.get(*key).filter(|value| !value.is_null()) {
            fields.insert((*key).to_string(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static URL: FieldSpec = FieldSpec::string("url", "url", "URL");
    static MAX_ALERTS: FieldSpec = FieldSpec::integer("max_alerts", "maxAlerts", "Max alerts");
    static SINGLE: FieldSpec = FieldSpec::bool("single_email", "singleEmail", "Single email");
    static DETAILS: FieldSpec = FieldSpec::string_map("details", "details", "Details");

    fn settings(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_unpack_field_skips_absent_and_null() {
        let raw = NotifierInstance::default()
            .with_field("url", "https://example.com")
            .with_field("max_alerts", Value::Null);
        let mut out = Map::new();
        unpack_field(&URL, &raw, &mut out);
        unpack_field(&MAX_ALERTS, &raw, &mut out);
        unpack_field(&SINGLE, &raw, &mut out);
        assert_eq!(Value::Object(out), json!({"url": "https://example.com"}));
    }

    #[test]
    fn test_pack_integer_from_string_or_number() {
        let mut fields = BTreeMap::new();
        let mut from_string = settings(json!({"maxAlerts": "10"}));
        pack_field(&MAX_ALERTS, &mut from_string, &mut fields);
        assert_eq!(fields["max_alerts"], json!(10));
        assert!(from_string.is_empty());

        let mut from_number = settings(json!({"maxAlerts": 3}));
        pack_field(&MAX_ALERTS, &mut from_number, &mut fields);
        assert_eq!(fields["max_alerts"], json!(3));
    }

    #[test]
    fn test_pack_mistyped_value_stays_in_settings() {
        let mut fields = BTreeMap::new();
        let mut remote = settings(json!({"singleEmail": "sometimes"}));
        pack_field(&SINGLE, &mut remote, &mut fields);
        assert!(fields.is_empty());
        assert_eq!(remote["singleEmail"], json!("sometimes"));
    }

    #[test]
    fn test_pack_empty_string_is_unset() {
        let mut fields = BTreeMap::new();
        let mut remote = settings(json!({"url": ""}));
        pack_field(&URL, &mut remote, &mut fields);
        assert!(fields.is_empty());
        assert!(remote.is_empty());
    }

    #[test]
    fn test_pack_whitespace_string_is_kept() {
        let mut fields = BTreeMap::new();
        let mut remote = settings(json!({"url": " "}));
        pack_field(&URL, &mut remote, &mut fields);
        assert_eq!(fields["url"], json!(" "));
        assert!(remote.is_empty());
    }

    #[test]
    fn test_pack_string_map_stringifies_values() {
        let mut fields = BTreeMap::new();
        let mut remote = settings(json!({"details": {"severity": "high", "count": 2}}));
        pack_field(&DETAILS, &mut remote, &mut fields);
        assert_eq!(fields["details"], json!({"severity": "high", "count": "2"}));
    }

    #[test]
    fn test_pack_secure_fields_prefers_prior() {
        let prior = NotifierInstance::default()
            .with_uid("u1")
            .with_field("url", "https://secret.example.com");
        let mut fields = BTreeMap::new();
        fields.insert("url".to_string(), json!("[REDACTED]"));

        pack_secure_fields(&mut fields, Some(&prior), &["url", "token"]);
        assert_eq!(fields["url"], json!("https://secret.example.com"));
        assert!(!fields.contains_key("token"));

        let mut untouched = BTreeMap::new();
        pack_secure_fields(&mut untouched, None, &["url"]);
        assert!(untouched.is_empty());
    }
}
