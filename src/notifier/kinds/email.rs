//! Email notifier.
//!
//! Addresses are a list in the declared configuration and a single
//! `;`-separated string in the backend.

use crate::models::ContactPoint;
use crate::notifier::{fields, normalize, FieldSpec, Notifier, NotifierMeta};
use crate::state::{ContactPointConfig, NotifierInstance};
use serde_json::Value;

const ADDRESSES_KEY: &str = "addresses";
const ADDRESS_SEPARATOR: &str = ";";

static META: NotifierMeta = NotifierMeta {
    field: "email",
    type_tag: "email",
    description: "A contact point that sends notifications to an email address.",
    secure_fields: &[],
};

static FIELDS: &[FieldSpec] = &[
    FieldSpec::string_list(
        ADDRESSES_KEY,
        ADDRESSES_KEY,
        "The addresses to send emails to.",
    )
    .required(),
    FieldSpec::bool(
        "single_email",
        "singleEmail",
        "Whether to send a single email CC'ing all addresses, rather than a separate email to each address. Defaults to false.",
    ),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the email. Defaults to ``.",
    ),
    FieldSpec::string(
        "subject",
        "subject",
        "The templated subject line of the email. Defaults to ``.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn unpack(&self, raw: &NotifierInstance, name: &str) -> ContactPoint {
        let mut point = fields::unpack_common_fields(&META, raw, name);
        for spec in FIELDS.iter().filter(|spec| spec.key != ADDRESSES_KEY) {
            fields::unpack_field(spec, raw, &mut point.settings);
        }

        if let Some(Value::Array(addresses)) = raw.fields.get(ADDRESSES_KEY) {
            let joined = addresses
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(ADDRESS_SEPARATOR);
            point
                .settings
                .insert(ADDRESSES_KEY.to_string(), Value::String(joined));
        }

        normalize::prune_empty_settings(&mut point.settings);
        point
    }

    fn pack(&self, point: &ContactPoint, _prior: &ContactPointConfig) -> NotifierInstance {
        let mut settings = point.settings.clone();
        let mut instance = fields::pack_common_fields(point);

        match settings.remove(ADDRESSES_KEY) {
            Some(Value::String(joined)) => {
                instance
                    .fields
                    .insert(ADDRESSES_KEY.to_string(), split_addresses(&joined).into());
            }
            Some(other) => {
                settings.insert(ADDRESSES_KEY.to_string(), other);
            }
            None => {}
        }

        for spec in FIELDS.iter().filter(|spec| spec.key != ADDRESSES_KEY) {
            fields::pack_field(spec, &mut settings, &mut instance.fields);
        }

        instance.settings = normalize::pack_settings(&settings);
        instance
    }
}

/// Split a backend address string on `,`, `;` and newlines
fn split_addresses(joined: &str) -> Vec<String> {
    joined
        .split(|c| matches!(c, ',' | ';' | '\n'))
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
