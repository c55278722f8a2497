//! Notifiers that post into chat and messaging services.

use crate::notifier::{FieldSpec, Notifier, NotifierMeta};
use crate::state::NotifierInstance;

static DINGDING_META: NotifierMeta = NotifierMeta {
    field: "dingding",
    type_tag: "dingding",
    description: "A contact point that sends notifications to DingDing.",
    secure_fields: &[],
};

static DINGDING_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The DingDing webhook URL.").required(),
    FieldSpec::string(
        "message_type",
        "msgType",
        "The format of message to send - either 'link' or 'actionCard'",
    ),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the message.",
    ),
    FieldSpec::string("title", "title", "The templated title of the message."),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DingDingNotifier;

impl Notifier for DingDingNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &DINGDING_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        DINGDING_FIELDS
    }
}

static DISCORD_META: NotifierMeta = NotifierMeta {
    field: "discord",
    type_tag: "discord",
    description: "A contact point that sends notifications as Discord messages",
    secure_fields: &["url"],
};

static DISCORD_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The discord webhook URL.")
        .required()
        .sensitive(),
    FieldSpec::string("title", "title", "The templated content of the title."),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the message.",
    ),
    FieldSpec::string(
        "avatar_url",
        "avatar_url",
        "The URL of a custom avatar image to use.",
    ),
    FieldSpec::bool(
        "use_discord_username",
        "use_discord_username",
        "Whether to use the bot account's plain username instead of \"Grafana.\"",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscordNotifier;

impl Notifier for DiscordNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &DISCORD_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        DISCORD_FIELDS
    }
}

static GOOGLECHAT_META: NotifierMeta = NotifierMeta {
    field: "googlechat",
    type_tag: "googlechat",
    description: "A contact point that sends notifications to Google Chat.",
    secure_fields: &["url"],
};

static GOOGLECHAT_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("url", "url", "The Google Chat webhook URL.")
        .required()
        .sensitive(),
    FieldSpec::string("title", "title", "The templated content of the title."),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the message.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleChatNotifier;

impl Notifier for GoogleChatNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &GOOGLECHAT_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        GOOGLECHAT_FIELDS
    }
}

static LINE_META: NotifierMeta = NotifierMeta {
    field: "line",
    type_tag: "LINE",
    description: "A contact point that sends notifications to LINE.me.",
    secure_fields: &["token"],
};

static LINE_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("token", "token", "The bearer token used to authorize the client.")
        .required()
        .sensitive(),
    FieldSpec::string("title", "title", "The templated title of the message."),
    FieldSpec::string(
        "description",
        "description",
        "The templated description of the message.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LineNotifier;

impl Notifier for LineNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &LINE_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        LINE_FIELDS
    }
}

static SLACK_META: NotifierMeta = NotifierMeta {
    field: "slack",
    type_tag: "slack",
    description: "A contact point that sends notifications to Slack.",
    secure_fields: &["url", "token"],
};

static SLACK_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "endpoint_url",
        "endpointUrl",
        "Use this to override the Slack API endpoint URL to send requests to.",
    ),
    FieldSpec::string(
        "url",
        "url",
        "A Slack webhook URL,for sending messages via the webhook method.",
    )
    .sensitive(),
    FieldSpec::string(
        "token",
        "token",
        "A Slack API token,for sending messages directly without the webhook method.",
    )
    .sensitive(),
    FieldSpec::string(
        "recipient",
        "recipient",
        "Channel, private group, or IM channel (can be an encoded ID or a name) to send messages to.",
    ),
    FieldSpec::string("text", "text", "Templated content of the message."),
    FieldSpec::string("title", "title", "Templated title of the message."),
    FieldSpec::string(
        "username",
        "username",
        "Username for the bot to use.",
    ),
    FieldSpec::string(
        "icon_emoji",
        "icon_emoji",
        "The name of a Slack workspace emoji to use as the bot icon.",
    ),
    FieldSpec::string(
        "icon_url",
        "icon_url",
        "A URL of an image to use as the bot icon.",
    ),
    FieldSpec::string(
        "mention_channel",
        "mentionChannel",
        "Describes how to ping the slack channel that messages are being sent to. Options are `here` for an @here ping, `channel` for @channel, or empty for no ping.",
    ),
    FieldSpec::string(
        "mention_users",
        "mentionUsers",
        "Comma-separated list of users to mention in the message.",
    ),
    FieldSpec::string(
        "mention_groups",
        "mentionGroups",
        "Comma-separated list of groups to mention in the message.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SlackNotifier;

impl Notifier for SlackNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &SLACK_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        SLACK_FIELDS
    }

    fn validate(&self, instance: &NotifierInstance) -> Result<(), String> {
        self.schema().validate_instance(instance)?;
        let has = |key: &str| instance.field_str(key).is_some_and(|v| !v.is_empty());
        if !has("url") && !has("token") {
            return Err("one of \"url\" or \"token\" must be set".to_string());
        }
        Ok(())
    }
}

static TEAMS_META: NotifierMeta = NotifierMeta {
    field: "teams",
    type_tag: "teams",
    description: "A contact point that sends notifications to Microsoft Teams.",
    secure_fields: &["url"],
};

static TEAMS_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "url",
        "url",
        "A Teams webhook URL.",
    )
    .required()
    .sensitive(),
    FieldSpec::string(
        "message",
        "message",
        "The templated message content to send.",
    ),
    FieldSpec::string(
        "title",
        "title",
        "The templated title of the message.",
    ),
    FieldSpec::string(
        "section_title",
        "sectiontitle",
        "The templated subtitle for each message section.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TeamsNotifier;

impl Notifier for TeamsNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &TEAMS_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        TEAMS_FIELDS
    }
}

static TELEGRAM_META: NotifierMeta = NotifierMeta {
    field: "telegram",
    type_tag: "telegram",
    description: "A contact point that sends notifications to Telegram.",
    secure_fields: &["token"],
};

static TELEGRAM_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("token", "bottoken", "The Telegram bot token.")
        .required()
        .sensitive(),
    FieldSpec::string(
        "chat_id",
        "chatid",
        "The chat ID to send messages to.",
    )
    .required(),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the message.",
    ),
    FieldSpec::string(
        "parse_mode",
        "parse_mode",
        "Mode for parsing entities in the message text. Supported: None, Markdown, MarkdownV2, and HTML. HTML is the default.",
    ),
    FieldSpec::bool(
        "disable_web_page_preview",
        "disable_web_page_preview",
        "When set it disables link previews for links in the message.",
    ),
    FieldSpec::bool(
        "protect_content",
        "protect_content",
        "When set it protects the contents of the message from forwarding and saving.",
    ),
    FieldSpec::bool(
        "disable_notifications",
        "disable_notifications",
        "When set users will receive a notification with no sound.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramNotifier;

impl Notifier for TelegramNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &TELEGRAM_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        TELEGRAM_FIELDS
    }
}

static THREEMA_META: NotifierMeta = NotifierMeta {
    field: "threema",
    type_tag: "threema",
    description: "A contact point that sends notifications to Threema.",
    secure_fields: &["api_secret"],
};

static THREEMA_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "gateway_id",
        "gateway_id",
        "The Threema gateway ID.",
    )
    .required(),
    FieldSpec::string(
        "recipient_id",
        "recipient_id",
        "The ID of the recipient of the message.",
    )
    .required(),
    FieldSpec::string(
        "api_secret",
        "api_secret",
        "The Threema API key.",
    )
    .required()
    .sensitive(),
    FieldSpec::string("title", "title", "The templated title of the message."),
    FieldSpec::string(
        "description",
        "description",
        "The templated description of the message.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreemaNotifier;

impl Notifier for ThreemaNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &THREEMA_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        THREEMA_FIELDS
    }
}

static WEBEX_META: NotifierMeta = NotifierMeta {
    field: "webex",
    type_tag: "webex",
    description: "A contact point that sends notifications to Cisco Webex.",
    secure_fields: &["token"],
};

static WEBEX_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("token", "bot_token", "The bearer token used to authorize the client.")
        .sensitive(),
    FieldSpec::string(
        "api_url",
        "api_url",
        "The URL to send webhook requests to.",
    ),
    FieldSpec::string(
        "message",
        "message",
        "The templated title of the message to send.",
    ),
    FieldSpec::string(
        "room_id",
        "room_id",
        "ID of the Webex Teams room where to send the messages.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct WebexNotifier;

impl Notifier for WebexNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &WEBEX_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        WEBEX_FIELDS
    }
}

static WECOM_META: NotifierMeta = NotifierMeta {
    field: "wecom",
    type_tag: "wecom",
    description: "A contact point that sends notifications to WeCom.",
    secure_fields: &["url", "secret"],
};

static WECOM_FIELDS: &[FieldSpec] = &[
    FieldSpec::string(
        "url",
        "url",
        "The WeCom webhook URL. Required if using GroupRobot.",
    )
    .sensitive(),
    FieldSpec::string(
        "secret",
        "secret",
        "The secret key required to obtain access token when using APIAPP. See https://work.weixin.qq.com/wework_admin/frame#apps to create APIAPP.",
    )
    .sensitive(),
    FieldSpec::string(
        "corp_id",
        "corp_id",
        "Corp ID used to get token when using APIAPP.",
    ),
    FieldSpec::string(
        "agent_id",
        "agent_id",
        "Agent ID added to the request payload when using APIAPP.",
    ),
    FieldSpec::string(
        "msg_type",
        "msgtype",
        "The type of them message. Supported: markdown, text. Default: text.",
    ),
    FieldSpec::string(
        "message",
        "message",
        "The templated content of the message to send.",
    ),
    FieldSpec::string(
        "title",
        "title",
        "The templated title of the message to send.",
    ),
    FieldSpec::string(
        "to_user",
        "touser",
        "The ID of user that should receive the message. Multiple entries should be separated by '|'. Default: @all.",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct WeComNotifier;

impl Notifier for WeComNotifier {
    fn meta(&self) -> &'static NotifierMeta {
        &WECOM_META
    }

    fn fields(&self) -> &'static [FieldSpec] {
        WECOM_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ContactPointConfig;
    use serde_json::json;

    #[test]
    fn test_slack_requires_url_or_token() {
        let empty = NotifierInstance::default().with_field("recipient", "#ops");
        let err = SlackNotifier.validate(&empty).unwrap_err();
        assert!(err.contains("url"));

        let with_token = empty.with_field("token", "xoxb-1");
        assert!(SlackNotifier.validate(&with_token).is_ok());
    }

    #[test]
    fn test_telegram_backend_keys() {
        let raw = NotifierInstance::default()
            .with_field("token", "bot-token")
            .with_field("chat_id", "-100123")
            .with_field("disable_notifications", true);
        let point = TelegramNotifier.unpack(&raw, "ops");
        assert_eq!(point.settings["bottoken"], json!("bot-token"));
        assert_eq!(point.settings["chatid"], json!("-100123"));
        assert_eq!(point.settings["disable_notifications"], json!(true));
    }

    #[test]
    fn test_line_uses_uppercase_type_tag() {
        let raw = NotifierInstance::default().with_field("token", "t");
        assert_eq!(LineNotifier.unpack(&raw, "ops").type_tag, "LINE");
    }

    #[test]
    fn test_redacted_token_is_replaced_by_prior() {
        let declared = NotifierInstance::default()
            .with_uid("t1")
            .with_field("token", "real-token")
            .with_field("chat_id", "42");
        let prior = ContactPointConfig::new("ops").with_notifier("telegram", declared.clone());

        let mut echoed = TelegramNotifier.unpack(&declared, "ops");
        echoed
            .settings
            .insert("bottoken".to_string(), json!("[REDACTED]"));

        assert_eq!(TelegramNotifier.pack(&echoed, &prior), declared);
    }
}
