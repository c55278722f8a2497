//! # Notifier Modules
//!
//! One codec per notifier kind, each mapping between the declared
//! [`NotifierInstance`] and the backend [`ContactPoint`] record.
//!
//! Every kind implements the `Notifier` trait. Most only declare their
//! metadata and field table and rely on the default pack/unpack, which move
//! each declared field to and from its backend settings key.

use crate::models::ContactPoint;
use crate::state::{ContactPointConfig, NotifierInstance};
use std::fmt::Debug;

pub mod fields;
pub mod kinds;
pub mod normalize;
pub mod registry;
pub mod schema;

pub use registry::NotifierRegistry;
pub use schema::{ContactPointShape, FieldKind, FieldSpec, NotifierGroupShape, NotifierSchema};

/// Static description of one notifier kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierMeta {
    /// Group name in the declared contact point, e.g. `email`
    pub field: &'static str,
    /// Backend discriminator, e.g. `prometheus-alertmanager`
    pub type_tag: &'static str,
    pub description: &'static str,
    /// Fields the backend never echoes; always taken from the declared state
    pub secure_fields: &'static [&'static str],
}

/// Codec for one notifier kind
pub trait Notifier: Send + Sync + Debug {
    fn meta(&self) -> &'static NotifierMeta;

    /// Kind-specific typed fields
    fn fields(&self) -> &'static [FieldSpec];

    fn schema(&self) -> NotifierSchema {
        NotifierSchema::new(self.fields())
    }

    /// Check one declared instance beyond what the field table expresses
    ///
    /// # Errors
    /// Returns a description of the first problem found
    fn validate(&self, instance: &NotifierInstance) -> Result<(), String> {
        self.schema().validate_instance(instance)
    }

    /// Declared instance to backend record
    fn unpack(&self, raw: &NotifierInstance, name: &str) -> ContactPoint {
        unpack_notifier(self.meta(), self.fields(), raw, name)
    }

    /// Backend record to declared instance.
    ///
    /// `prior` is the previously declared contact point; secure fields are
    /// taken from its instance with the same UID.
    fn pack(&self, point: &ContactPoint, prior: &ContactPointConfig) -> NotifierInstance {
        pack_notifier(self.meta(), self.fields(), point, prior)
    }
}

/// Default unpack: common fields, raw settings, then every declared typed field
#[must_use]
pub fn unpack_notifier(
    meta: &NotifierMeta,
    specs: &[FieldSpec],
    raw: &NotifierInstance,
    name: &str,
) -> ContactPoint {
    let mut point = fields::unpack_common_fields(meta, raw, name);
    for spec in specs {
        fields::unpack_field(spec, raw, &mut point.settings);
    }
    normalize::prune_empty_settings(&mut point.settings);
    point
}

/// Default pack: claim typed fields out of the settings, carry secure fields
/// forward, keep whatever is left as normalized passthrough settings
#[must_use]
pub fn pack_notifier(
    meta: &NotifierMeta,
    specs: &[FieldSpec],
    point: &ContactPoint,
    prior: &ContactPointConfig,
) -> NotifierInstance {
    let mut settings = point.settings.clone();
    let mut instance = fields::pack_common_fields(point);
    for spec in specs {
        fields::pack_field(spec, &mut settings, &mut instance.fields);
    }
    fields::pack_secure_fields(
        &mut instance.fields,
        prior.find_notifier(meta.field, &point.uid),
        meta.secure_fields,
    );
    instance.settings = normalize::pack_settings(&settings);
    instance
}

/// A declared instance paired with the backend record derived from it
#[derive(Debug, Clone)]
pub struct DesiredNotifier<'a> {
    pub notifier: &'a dyn Notifier,
    pub state: NotifierInstance,
    pub backend: ContactPoint,
}

impl DesiredNotifier<'_> {
    /// UID already assigned to this instance, if any
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        Some(self.state.uid.as_str()).filter(|uid| !uid.is_empty())
    }
}
