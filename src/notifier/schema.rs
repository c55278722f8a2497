//! # Notifier Schema
//!
//! Declarative description of the fields each notifier kind accepts, used
//! to validate declared configuration and to expose the configuration shape.

use crate::state::NotifierInstance;
use serde::Serialize;
use serde_json::Value;

/// Value type of a notifier field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Bool,
    Integer,
    StringList,
    StringMap,
}

impl FieldKind {
    /// Whether a declared value has this type
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::StringMap => value
                .as_object()
                .is_some_and(|entries| entries.values().all(Value::is_string)),
        }
    }
}

/// One typed field of a notifier kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Name in the declared configuration
    pub key: &'static str,
    /// Key inside the backend `settings` map
    #[serde(skip)]
    pub backend_key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub sensitive: bool,
    /// Set by the server, never declared
    pub computed: bool,
    pub description: &'static str,
}

impl FieldSpec {
    const fn new(
        key: &'static str,
        backend_key: &'static str,
        kind: FieldKind,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            backend_key,
            kind,
            required: false,
            sensitive: false,
            computed: false,
            description,
        }
    }

    #[must_use]
    pub const fn string(
        key: &'static str,
        backend_key: &'static str,
        description: &'static str,
    ) -> Self {
        Self::new(key, backend_key, FieldKind::String, description)
    }

    #[must_use]
    pub const fn bool(key: &'static str, backend_key: &'static str, description: &'static str) -> Self {
        Self::new(key, backend_key, FieldKind::Bool, description)
    }

    #[must_use]
    pub const fn integer(
        key: &'static str,
        backend_key: &'static str,
        description: &'static str,
    ) -> Self {
        Self::new(key, backend_key, FieldKind::Integer, description)
    }

    #[must_use]
    pub const fn string_list(
        key: &'static str,
        backend_key: &'static str,
        description: &'static str,
    ) -> Self {
        Self::new(key, backend_key, FieldKind::StringList, description)
    }

    #[must_use]
    pub const fn string_map(
        key: &'static str,
        backend_key: &'static str,
        description: &'static str,
    ) -> Self {
        Self::new(key, backend_key, FieldKind::StringMap, description)
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

/// Fields every notifier kind carries
pub static COMMON_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("uid", "", "The UID of the contact point.").computed(),
    FieldSpec::bool(
        "disable_resolve_message",
        "",
        "Whether to disable sending resolve messages. Defaults to false.",
    ),
    FieldSpec::string_map(
        "settings",
        "",
        "Additional custom properties to attach to the notifier.",
    )
    .sensitive(),
];

/// Field set of one notifier kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifierSchema {
    pub common: &'static [FieldSpec],
    pub fields: &'static [FieldSpec],
}

impl NotifierSchema {
    #[must_use]
    pub fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            common: COMMON_FIELDS,
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }

    /// Check the kind-specific fields of one declared instance
    ///
    /// # Errors
    /// Returns a description of the first unknown, missing or mistyped field
    pub fn validate_instance(&self, instance: &NotifierInstance) -> Result<(), String> {
        if let Some(unknown) = instance
            .fields
            .keys()
            .find(|key| self.field(key).is_none())
        {
            return Err(format!("unknown field {unknown:?}"));
        }

        for spec in self.fields {
            match instance.fields.get(spec.key) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(format!("missing required field {:?}", spec.key));
                    }
                }
                Some(value) if !spec.kind.accepts(value) => {
                    return Err(format!(
                        "field {:?} must be of type {:?}",
                        spec.key, spec.kind
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Shape of one optional, repeatable notifier group of a contact point
#[derive(Debug, Clone, Serialize)]
pub struct NotifierGroupShape {
    pub field: &'static str,
    pub type_tag: &'static str,
    pub description: &'static str,
    pub schema: NotifierSchema,
}

/// Shape of a whole contact point: every known group, at least one of which must be set
#[derive(Debug, Clone, Serialize)]
pub struct ContactPointShape {
    pub groups: Vec<NotifierGroupShape>,
    pub at_least_one_of: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::string("url", "url", "The URL.").required(),
        FieldSpec::integer("max_alerts", "maxAlerts", "Max alerts."),
        FieldSpec::string_list("addresses", "addresses", "Addresses."),
    ];

    #[test]
    fn test_field_kind_accepts() {
        assert!(FieldKind::String.accepts(&json!("x")));
        assert!(!FieldKind::String.accepts(&json!(1)));
        assert!(FieldKind::Integer.accepts(&json!(3)));
        assert!(!FieldKind::Integer.accepts(&json!(3.5)));
        assert!(FieldKind::StringList.accepts(&json!(["a", "b"])));
        assert!(!FieldKind::StringList.accepts(&json!(["a", 1])));
        assert!(FieldKind::StringMap.accepts(&json!({"a": "b"})));
        assert!(!FieldKind::StringMap.accepts(&json!({"a": true})));
    }

    #[test]
    fn test_validate_instance() {
        let schema = NotifierSchema::new(FIELDS);

        let ok = NotifierInstance::default()
            .with_field("url", "https://example.com")
            .with_field("max_alerts", 5);
        assert!(schema.validate_instance(&ok).is_ok());

        let missing = NotifierInstance::default().with_field("max_alerts", 5);
        assert_eq!(
            schema.validate_instance(&missing).unwrap_err(),
            "missing required field \"url\""
        );

        let unknown = ok.clone().with_field("colour", "red");
        assert!(schema
            .validate_instance(&unknown)
            .unwrap_err()
            .contains("colour"));

        let mistyped = ok.with_field("max_alerts", "five");
        assert!(schema
            .validate_instance(&mistyped)
            .unwrap_err()
            .contains("max_alerts"));
    }

    #[test]
    fn test_common_fields() {
        let keys: Vec<_> = COMMON_FIELDS.iter().map(|spec| spec.key).collect();
        assert_eq!(keys, vec!["uid", "disable_resolve_message", "settings"]);
        assert!(COMMON_FIELDS[0].computed);
        assert!(COMMON_FIELDS[2].sensitive);
    }
}
