//! Notifiers that open incidents or page people: Opsgenie, PagerDuty,
//! Pushover, Sensu Go and VictorOps.

use crate::notifier::{FieldSpec, Notifier, NotifierMeta};

static OPSGENIE_META: NotifierMeta = NotifierMeta {
    field: "opsgenie",
    type_tag: "opsgenie",
    description: "A contact point that sends notifications to OpsGenie.",
    secure_fields: &["api_key"],
};

static OPSGENIE_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "url",
        "apiUrl",
        "Allows customization of the OpsGenie API URL.",
    ),
    FieldSpec::string("api_key", "apiKey", "The OpsGenie API key to use.")
        .required()
        .sensitive(),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the message.",
    ),
    FieldSpec::string(
        "description",
        "description",
        "A templated high-level description to use for the alert.",
    ),
    FieldSpec::bool(
        "auto_close",
        "autoClose",
        "Whether to auto-close alerts in OpsGenie when they resolve in the Alertmanager.",
    ),
    FieldSpec::bool(
        "override_priority",
        "overridePriority",
        "Whether to allow the alert priority to be configured via the value of the `og_priority` annotation on the alert.",
    ),
    FieldSpec::string(
        "send_tags_as",
        "sendTagsAs",
        "Whether to send annotations to OpsGenie as Tags, Details, or both. Supported values are `tags`, `details`, `both`, or empty to use the default behavior of Tags.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct OpsgenieNotifier;

impl Notifier for OpsgenieNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &OPSGENIE_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        OPSGENIE_FIELDS
    }
}

static PAGERDUTY_META: NotifierMeta = NotifierMeta {
    field: "pagerduty",
    type_tag: "pagerduty",
    description: "A contact point that sends notifications to PagerDuty.",
    secure_fields: &["integration_key"],
};

static PAGERDUTY_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "integration_key",
        "integrationKey",
        "The PagerDuty API key.",
    )
    .required()
    .sensitive(),
    FieldSpec::string(
        "severity",
        "severity",
        "The PagerDuty event severity level. Default is `critical`.",
    ),
    FieldSpec::string("class", "class", "The class or type of the event."),
    FieldSpec::string(
        "component",
        "component",
        "The component being affected by the event.",
    ),
    FieldSpec::string("group", "group", "The group to which the provided component belongs to."),
    FieldSpec::string(
        "summary",
        "summary",
        "The templated summary message of the event.",
    ),
    FieldSpec::string(
        "source",
        "source",
        "The unique location of the affected system.",
    ),
    FieldSpec::string("client", "client", "The name of the monitoring client that is triggering this event."),
    FieldSpec::string("client_url", "client_url", "The URL of the monitoring client that is triggering this event."),
    FieldSpec::string_map(
        "details",
        "details",
        "A set of arbitrary key/value pairs that provide further detail about the incident.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PagerDutyNotifier;

impl Notifier for PagerDutyNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &PAGERDUTY_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        PAGERDUTY_FIELDS
    }
}

static PUSHOVER_META: NotifierMeta = NotifierMeta {
    field: "pushover",
    type_tag: "pushover",
    description: "A contact point that sends notifications to Pushover.",
    secure_fields: &["user_key", "api_token"],
};

static PUSHOVER_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("user_key", "userKey", "The Pushover user key.")
        .required()
        .sensitive(),
    FieldSpec::string("api_token", "apiToken", "The Pushover API token.")
        .required()
        .sensitive(),
    FieldSpec::integer(
        "priority",
        "priority",
        "The priority level of the event.",
    ),
    FieldSpec::integer(
        "ok_priority",
        "okPriority",
        "The priority level of the resolved event.",
    ),
    FieldSpec::integer(
        "retry",
        "retry",
        "How often, in seconds, the Pushover servers will send the same notification to the user.",
    ),
    FieldSpec::integer(
        "expire",
        "expire",
        "How many seconds for which the notification will continue to be retried by Pushover.",
    ),
    FieldSpec::string(
        "device",
        "device",
        "Comma-separated list of devices to which the event is associated.",
    ),
    FieldSpec::string(
        "sound",
        "sound",
        "The sound associated with the notification.",
    ),
    FieldSpec::string(
        "ok_sound",
        "okSound",
        "The sound associated with the resolved notification.",
    ),
    FieldSpec::string("title", "title", "The templated title of the message."),
    FieldSpec::string(
        "message",
        "message",
        "The templated notification message content.",
    ),
    FieldSpec::bool(
        "upload_image",
        "uploadImage",
        "Whether to send images in the notification or not. Default is true. Requires Grafana to be configured to send images in notifications.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PushoverNotifier;

impl Notifier for PushoverNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &PUSHOVER_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        PUSHOVER_FIELDS
    }
}

static SENSUGO_META: NotifierMeta = NotifierMeta {
    field: "sensugo",
    type_tag: "sensugo",
    description: "A contact point that sends notifications to SensuGo.",
    secure_fields: &["api_key"],
};

static SENSUGO_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The SensuGo URL to send requests to.").required(),
    FieldSpec::string("api_key", "apikey", "The SensuGo API key.")
        .required()
        .sensitive(),
    FieldSpec::string(
        "entity",
        "entity",
        "The entity being monitored.",
    ),
    FieldSpec::string(
        "check",
        "check",
        "The SensuGo check to which the event should be routed.",
    ),
    FieldSpec::string(
        "namespace",
        "namespace",
        "The namespace in which the check resides.",
    ),
    FieldSpec::string(
        "handler",
        "handler",
        "A custom handler to execute in addition to the check.",
    ),
    FieldSpec::string(
        "message",
        "message",
        "Templated message content describing the alert.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SensuGoNotifier;

impl Notifier for SensuGoNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &SENSUGO_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        SENSUGO_FIELDS
    }
}

static VICTOROPS_META: NotifierMeta = NotifierMeta {
    field: "victorops",
    type_tag: "victorops",
    description: "A contact point that sends notifications to VictorOps (now known as Splunk OnCall).",
    secure_fields: &["url"],
};

static VICTOROPS_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The VictorOps webhook URL.")
        .required()
        .sensitive(),
    FieldSpec::string(
        "message_type",
        "messageType",
        "The VictorOps alert state - typically either `CRITICAL` or `RECOVERY`.",
    ),
    FieldSpec::string(
        "title",
        "title",
        "Templated title to display.",
    ),
    FieldSpec::string(
        "description",
        "description",
        "Templated description of the message.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct VictorOpsNotifier;

impl Notifier for VictorOpsNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &VICTOROPS_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        VICTOROPS_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactPoint;
    use crate::state::{ContactPointConfig, NotifierInstance};
    use serde_json::json;

    #[test]
    fn test_pagerduty_details_map() {
        let raw = NotifierInstance::default()
            .with_field("integration_key", "key")
            .with_field("details", json!({"team": "infra"}));
        assert!(PagerDutyNotifier.validate(&raw).is_ok());
        let point = PagerDutyNotifier.unpack(&raw, "ops");
        assert_eq!(point.settings["details"], json!({"team": "infra"}));
    }

    #[test]
    fn test_pushover_integers_survive_backend_strings() {
        let point = ContactPoint {
            uid: "p1".to_string(),
            name: "ops".to_string(),
            type_tag: "pushover".to_string(),
            settings: json!({"priority": "1", "retry": 30, "expire": "", "uploadImage": true})
                .as_object()
                .cloned()
                .unwrap_or_default(),
            disable_resolve_message: false,
        };
        let packed = PushoverNotifier.pack(&point, &ContactPointConfig::default());
        assert_eq!(packed.fields["priority"], json!(1));
        assert_eq!(packed.fields["retry"], json!(30));
        assert_eq!(packed.fields["upload_image"], json!(true));
        assert!(!packed.fields.contains_key("expire"));
    }

    #[test]
    fn test_opsgenie_url_maps_to_api_url() {
        let raw = NotifierInstance::default()
            .with_field("api_key", "k")
            .with_field("url", "https://api.eu.opsgenie.com/v2/alerts");
        let point = OpsgenieNotifier.unpack(&raw, "ops");
        assert_eq!(
            point.settings["apiUrl"],
            json!("https://api.eu.opsgenie.com/v2/alerts")
        );
        assert!(!point.settings.contains_key("url"));
    }
}
