//! # Notifier Registry
//!
//! Ordered table of every known notifier kind, indexed by declared group
//! name and by backend type tag. Built once per process.

use crate::error::ProvisionError;
use crate::models::ContactPoint;
use crate::notifier::kinds;
use crate::notifier::{ContactPointShape, DesiredNotifier, Notifier, NotifierGroupShape};
use crate::state::ContactPointConfig;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("notifier group {0:?} registered twice")]
    DuplicateField(&'static str),

    #[error("notifier type tag {0:?} registered twice")]
    DuplicateTypeTag(&'static str),
}

static GLOBAL_REGISTRY: LazyLock<NotifierRegistry> = LazyLock::new(|| {
    NotifierRegistry::new(kinds::builtin()).expect("built-in notifier kinds are unique")
});

#[derive(Debug)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
    by_field: HashMap<&'static str, usize>,
    by_type_tag: HashMap<&'static str, usize>,
}

impl NotifierRegistry {
    /// Build a registry, keeping the given order
    ///
    /// # Errors
    /// Returns an error if two kinds share a group name or a type tag
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Result<Self, RegistryError> {
        let mut by_field = HashMap::with_capacity(notifiers.len());
        let mut by_type_tag = HashMap::with_capacity(notifiers.len());

        for (index, notifier) in notifiers.iter().enumerate() {
            let meta = notifier.meta();
            if by_field.insert(meta.field, index).is_some() {
                return Err(RegistryError::DuplicateField(meta.field));
            }
            if by_type_tag.insert(meta.type_tag, index).is_some() {
                return Err(RegistryError::DuplicateTypeTag(meta.type_tag));
            }
        }

        Ok(Self {
            notifiers,
            by_field,
            by_type_tag,
        })
    }

    /// The registry of built-in kinds
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_REGISTRY
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Notifier + 'static)> {
        self.notifiers.iter().map(Box::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    #[must_use]
    pub fn lookup_by_type_tag(&self, type_tag: &str) -> Option<&dyn Notifier> {
        self.by_type_tag
            .get(type_tag)
            .map(|index| self.notifiers[*index].as_ref())
    }

    #[must_use]
    pub fn lookup_by_field(&self, field: &str) -> Option<&dyn Notifier> {
        self.by_field
            .get(field)
            .map(|index| self.notifiers[*index].as_ref())
    }

    /// Every group a contact point may declare; at least one must be present
    #[must_use]
    pub fn configuration_shape(&self) -> ContactPointShape {
        let groups: Vec<NotifierGroupShape> = self
            .iter()
            .map(|notifier| {
                let meta = notifier.meta();
                NotifierGroupShape {
                    field: meta.field,
                    type_tag: meta.type_tag,
                    description: meta.description,
                    schema: notifier.schema(),
                }
            })
            .collect();
        let at_least_one_of = groups.iter().map(|group| group.field).collect();

        ContactPointShape {
            groups,
            at_least_one_of,
        }
    }

    /// Check a declared contact point against the configuration shape
    ///
    /// # Errors
    /// Returns [`ProvisionError::InvalidConfig`] naming the offending group and instance
    pub fn validate(&self, config: &ContactPointConfig) -> Result<(), ProvisionError> {
        if config.name.trim().is_empty() {
            return Err(ProvisionError::invalid_contact_point(
                &config.name,
                "name must not be empty",
            ));
        }

        if config.notifiers.values().all(Vec::is_empty) {
            return Err(ProvisionError::invalid_contact_point(
                &config.name,
                "at least one notifier must be configured",
            ));
        }

        for (field, instances) in &config.notifiers {
            let notifier = self.lookup_by_field(field).ok_or_else(|| {
                ProvisionError::invalid_contact_point(
                    &config.name,
                    format!("unknown notifier group {field:?}"),
                )
            })?;

            for (index, instance) in instances.iter().enumerate() {
                notifier.validate(instance).map_err(|reason| {
                    ProvisionError::invalid_contact_point(
                        &config.name,
                        format!("{field}[{index}]: {reason}"),
                    )
                })?;
            }
        }

        Ok(())
    }

    /// Derive backend records for every declared instance.
    ///
    /// Groups come out in registry order, instances in declared order.
    ///
    /// # Errors
    /// Returns an error if the contact point fails validation
    pub fn unpack_contact_point<'a>(
        &'a self,
        config: &ContactPointConfig,
    ) -> Result<Vec<DesiredNotifier<'a>>, ProvisionError> {
        self.validate(config)?;

        let mut desired = Vec::new();
        for notifier in self.iter() {
            let Some(instances) = config.notifiers.get(notifier.meta().field) else {
                continue;
            };
            for instance in instances {
                desired.push(DesiredNotifier {
                    notifier,
                    backend: notifier.unpack(instance, &config.name),
                    state: instance.clone(),
                });
            }
        }

        Ok(desired)
    }

    /// Fold backend records back into one declared contact point.
    ///
    /// Records with an unknown type tag are skipped. The name is taken from
    /// the first record; `id` and `org_id` are left for the caller.
    #[must_use]
    pub fn pack_contact_points(
        &self,
        points: &[ContactPoint],
        prior: &ContactPointConfig,
    ) -> ContactPointConfig {
        let mut notifiers: BTreeMap<String, Vec<_>> = BTreeMap::new();

        for point in points {
            let Some(notifier) = self.lookup_by_type_tag(&point.type_tag) else {
                debug!(
                    "Skipping notifier {} of unsupported type {:?} in contact point {}",
                    point.uid, point.type_tag, point.name
                );
                continue;
            };
            notifiers
                .entry(notifier.meta().field.to_string())
                .or_default()
                .push(notifier.pack(point, prior));
        }

        ContactPointConfig {
            id: None,
            org_id: None,
            name: points
                .first()
                .map(|point| point.name.clone())
                .unwrap_or_default(),
            notifiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::kinds::{EmailNotifier, SlackNotifier};
    use crate::state::NotifierInstance;
    use serde_json::json;

    fn email(address: &str) -> NotifierInstance {
        NotifierInstance::default().with_field("addresses", json!([address]))
    }

    #[test]
    fn test_global_registry_indexes() {
        let registry = NotifierRegistry::global();
        assert_eq!(registry.len(), 20);
        assert_eq!(
            registry
                .lookup_by_type_tag("prometheus-alertmanager")
                .map(|n| n.meta().field),
            Some("alertmanager")
        );
        assert_eq!(
            registry.lookup_by_field("line").map(|n| n.meta().type_tag),
            Some("LINE")
        );
        assert!(registry.lookup_by_type_tag("carrier-pigeon").is_none());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let err = NotifierRegistry::new(vec![Box::new(EmailNotifier), Box::new(EmailNotifier)])
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateField("email"));
        assert!(NotifierRegistry::new(vec![Box::new(EmailNotifier), Box::new(SlackNotifier)]).is_ok());
    }

    #[test]
    fn test_configuration_shape_lists_every_group() {
        let shape = NotifierRegistry::global().configuration_shape();
        assert_eq!(shape.groups.len(), 20);
        assert_eq!(shape.at_least_one_of.len(), 20);
        assert!(shape.at_least_one_of.contains(&"webhook"));
        let rendered = serde_json::to_value(&shape).unwrap();
        assert_eq!(rendered["groups"][0]["field"], json!("alertmanager"));
    }

    #[test]
    fn test_validate_requires_a_notifier() {
        let registry = NotifierRegistry::global();
        let err = registry.validate(&ContactPointConfig::new("ops")).unwrap_err();
        assert!(err.to_string().contains("at least one notifier"));

        let unknown = ContactPointConfig::new("ops").with_notifier("fax", NotifierInstance::default());
        assert!(registry.validate(&unknown).unwrap_err().to_string().contains("fax"));

        let bad = ContactPointConfig::new("ops").with_notifier("email", NotifierInstance::default());
        assert!(registry
            .validate(&bad)
            .unwrap_err()
            .to_string()
            .contains("email[0]"));
    }

    #[test]
    fn test_unpack_orders_by_registry_then_declaration() {
        let config = ContactPointConfig::new("ops")
            .with_notifier(
                "webhook",
                NotifierInstance::default().with_field("url", "https://hooks.example.com"),
            )
            .with_notifier("email", email("a@example.com"))
            .with_notifier("email", email("b@example.com"));
        let desired = NotifierRegistry::global()
            .unpack_contact_point(&config)
            .unwrap();
        let tags: Vec<_> = desired.iter().map(|d| d.backend.type_tag.as_str()).collect();
        assert_eq!(tags, vec!["email", "email", "webhook"]);
        assert_eq!(desired[1].backend.settings["addresses"], json!("b@example.com"));
        assert!(desired.iter().all(|d| d.backend.name == "ops"));
    }

    #[test]
    fn test_pack_skips_unknown_type_tags() {
        let points = vec![
            ContactPoint {
                uid: "e1".to_string(),
                name: "ops".to_string(),
                type_tag: "email".to_string(),
                settings: json!({"addresses": "a@example.com"})
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                disable_resolve_message: false,
            },
            ContactPoint {
                uid: "x1".to_string(),
                name: "ops".to_string(),
                type_tag: "carrier-pigeon".to_string(),
                ..ContactPoint::default()
            },
        ];
        let packed =
            NotifierRegistry::global().pack_contact_points(&points, &ContactPointConfig::default());
        assert_eq!(packed.name, "ops");
        assert_eq!(packed.notifiers.len(), 1);
        assert_eq!(packed.uids(), vec!["e1"]);
    }
}
