//! # Notifier Kinds
//!
//! Every supported notifier kind, grouped by the kind of service it talks to.

use crate::notifier::Notifier;

mod chat;
mod email;
mod http;
mod incident;

pub use chat::{
    DingDingNotifier, DiscordNotifier, GoogleChatNotifier, LineNotifier, SlackNotifier,
    TeamsNotifier, TelegramNotifier, ThreemaNotifier, WeComNotifier, WebexNotifier,
};
pub use email::EmailNotifier;
pub use http::{AlertmanagerNotifier, KafkaNotifier, OnCallNotifier, WebhookNotifier};
pub use incident::{
    OpsgenieNotifier, PagerDutyNotifier, PushoverNotifier, SensuGoNotifier, VictorOpsNotifier,
};

/// Every built-in kind, in registry order
#[must_use]
pub fn builtin() -> Vec<Box<dyn Notifier>> {
    vec![
        Box::new(AlertmanagerNotifier),
        Box::new(DingDingNotifier),
        Box::new(DiscordNotifier),
        Box::new(EmailNotifier),
        Box::new(GoogleChatNotifier),
        Box::new(KafkaNotifier),
        Box::new(LineNotifier),
        Box::new(OnCallNotifier),
        Box::new(OpsgenieNotifier),
        Box::new(PagerDutyNotifier),
        Box::new(PushoverNotifier),
        Box::new(SensuGoNotifier),
        Box::new(SlackNotifier),
        Box::new(TeamsNotifier),
        Box::new(TelegramNotifier),
        Box::new(ThreemaNotifier),
        Box::new(VictorOpsNotifier),
        Box::new(WebexNotifier),
        Box::new(WebhookNotifier),
        Box::new(WeComNotifier),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_fields_are_declared_sensitive() {
        for notifier in builtin() {
            let meta = notifier.meta();
            for secure in meta.secure_fields {
                let spec = notifier
                    .schema()
                    .field(secure)
                    .unwrap_or_else(|| panic!("{}: unknown secure field {secure}", meta.field));
                assert!(spec.sensitive, "{}: {secure} is not sensitive", meta.field);
            }
        }
    }

    #[test]
    fn test_backend_keys_are_unique_per_kind() {
        for notifier in builtin() {
            let mut keys: Vec<_> = notifier.fields().iter().map(|f| f.backend_key).collect();
            let total = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), total, "{}", notifier.meta().field);
        }
    }

    #[test]
    fn test_twenty_kinds() {
        assert_eq!(builtin().len(), 20);
    }
}
