//! Notifiers that post to a generic HTTP endpoint: Alertmanager, Kafka REST
//! Proxy, Grafana OnCall and plain webhooks.

use crate::notifier::{FieldSpec, Notifier, NotifierMeta};
use crate::state::NotifierInstance;

static ALERTMANAGER_META: NotifierMeta = NotifierMeta {
    field: "alertmanager",
    type_tag: "prometheus-alertmanager",
    description: "A contact point that sends notifications to other Alertmanager instances.",
    secure_fields: &["basic_auth_password"],
};

static ALERTMANAGER_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The URL of the Alertmanager instance.").required(),
    FieldSpec::string(
        "basic_auth_user",
        "basicAuthUser",
        "The username component of the basic auth credentials to use.",
    ),
    FieldSpec::string(
        "basic_auth_password",
        "basicAuthPassword",
        "The password component of the basic auth credentials to use.",
    )
    .sensitive(),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertmanagerNotifier;

impl Notifier for AlertmanagerNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &ALERTMANAGER_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        ALERTMANAGER_FIELDS
    }
}

static KAFKA_META: NotifierMeta = NotifierMeta {
    field: "kafka",
    type_tag: "kafka",
    description: "A contact point that publishes notifications to Apache Kafka topics.",
    secure_fields: &["rest_proxy_url", "password"],
};

static KAFKA_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "rest_proxy_url",
        "kafkaRestProxy",
        "The URL of the Kafka REST proxy to send requests to.",
    )
    .required()
    .sensitive(),
    FieldSpec::string(
        "topic",
        "kafkaTopic",
        "The name of the Kafka topic to publish to.",
    )
    .required(),
    FieldSpec::string(
        "description",
        "description",
        "Templated description of the Kafka message.",
    ),
    FieldSpec::string(
        "details",
        "details",
        "Templated details to include with the message.",
    ),
    FieldSpec::string(
        "username",
        "username",
        "The user name to use when making a call to the Kafka REST Proxy.",
    ),
    FieldSpec::string(
        "password",
        "password",
        "The password to use when making a call to the Kafka REST Proxy.",
    )
    .sensitive(),
    FieldSpec::string(
        "api_version",
        "apiVersion",
        "The API version to use when contacting the Kafka REST Server. Supported: v2 (default) and v3.",
    ),
    FieldSpec::string(
        "cluster_id",
        "kafkaClusterId",
        "The Id of cluster to use when contacting the Kafka REST Server. Required api_version to be 'v3'.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KafkaNotifier;

impl Notifier for KafkaNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &KAFKA_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        KAFKA_FIELDS
    }
}

/// Fields shared by the webhook and OnCall kinds; the backend uses the same
/// settings layout for both
static WEBHOOK_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The URL to send webhook requests to.").required(),
    FieldSpec::string(
        "http_method",
        "httpMethod",
        "The HTTP method to use in the request. Defaults to `POST`.",
    ),
    FieldSpec::string(
        "basic_auth_user",
        "username",
        "The username to use in basic auth headers attached to the request. If omitted, basic auth will not be used.",
    ),
    FieldSpec::string(
        "basic_auth_password",
        "password",
        "The password to use in basic auth headers attached to the request. If omitted, basic auth will not be used.",
    )
    .sensitive(),
    FieldSpec::string(
        "authorization_scheme",
        "authorization_scheme",
        "Allows a custom authorization scheme - attaches an auth header with this name. Do not use in conjunction with basic auth parameters.",
    ),
    FieldSpec::string(
        "authorization_credentials",
        "authorization_credentials",
        "Allows a custom authorization scheme - attaches an auth header with this value. Do not use in conjunction with basic auth parameters.",
    )
    .sensitive(),
    FieldSpec::integer(
        "max_alerts",
        "maxAlerts",
        "The maximum number of alerts to send in a single request. This can be helpful in limiting the size of the request body. The default is 0, which indicates no limit.",
    ),
    FieldSpec::string(
        "message",
        "message",
        "Custom message. You can use template variables.",
    ),
    FieldSpec::string("title", "title", "Templated title of the message."),
];

static WEBHOOK_SECURE_FIELDS: &[&str] = &["basic_auth_password", "authorization_credentials"];

/// Basic auth and a custom authorization header are mutually exclusive
fn validate_auth_exclusive(instance: &NotifierInstance) -> Result<(), String> {
    let basic = ["basic_auth_user", "basic_auth_password"]
        .iter()
        .any(|key| instance.field_str(key).is_some_and(|v| !v.is_empty()));
    let custom = ["authorization_scheme", "authorization_credentials"]
        .iter()
        .any(|key| instance.field_str(key).is_some_and(|v| !v.is_empty()));

    if basic && custom {
        return Err(
            "basic auth and authorization_scheme/authorization_credentials cannot be used together"
                .to_string(),
        );
    }
    Ok(())
}

static ONCALL_META: NotifierMeta = NotifierMeta {
    field: "oncall",
    type_tag: "oncall",
    description: "A contact point that sends notifications to Grafana On-Call.",
    secure_fields: WEBHOOK_SECURE_FIELDS,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OnCallNotifier;

impl Notifier for OnCallNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &ONCALL_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        WEBHOOK_FIELDS
    }

    fn validate(&self, instance: &NotifierInstance) -> Result<(), String> {
        self.schema().validate_instance(instance)?;
        validate_auth_exclusive(instance)
    }
}

static WEBHOOK_META: NotifierMeta = NotifierMeta {
    field: "webhook",
    type_tag: "webhook",
    description: "A contact point that sends notifications to an arbitrary webhook, using the Prometheus webhook format defined here: https://prometheus.io/docs/alerting/latest/configuration/#webhook_config",
    secure_fields: WEBHOOK_SECURE_FIELDS,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookNotifier;

impl Notifier for WebhookNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &WEBHOOK_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        WEBHOOK_FIELDS
    }

    fn validate(&self, instance: &NotifierInstance) -> Result<(), String> {
        self.schema().validate_instance(instance)?;
        validate_auth_exclusive(instance)
    }
}
