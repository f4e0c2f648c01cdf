//! Meta webhook payloads and verification
//!
//! Only the fields the bridge reads are modelled. Everything else in the
//! notification is ignored by serde.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Result, WhatsAppError};

/// `object` value of WhatsApp Business Account notifications
pub const BUSINESS_ACCOUNT_OBJECT: &str = "whatsapp_business_account";

/// Top-level webhook notification from Meta
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookNotification {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: Option<WebhookValue>,
}

/// Messages, contacts and metadata carried by a change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    #[serde(default)]
    pub contacts: Vec<WebhookContact>,
    #[serde(default)]
    pub metadata: Option<WebhookMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMessage {
    /// Sender phone number, without `+`
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type")]
    pub msg_type: Option<String>,
    #[serde(default)]
    pub text: Option<WebhookText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookText {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookContact {
    #[serde(default)]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub profile: Option<WebhookProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookProfile {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMetadata {
    #[serde(default)]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
}

/// A text message pulled out of a notification, with its sender's profile name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub from: String,
    pub name: String,
    pub body: String,
}

impl WebhookNotification {
    /// Parse a raw notification body
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| WhatsAppError::InvalidPayload(e.to_string()))
    }

    pub fn is_business_account(&self) -> bool {
        self.object == BUSINESS_ACCOUNT_OBJECT
    }

    /// One [`InboundText`] per `messages` change.
    ///
    /// Only the first message and the first contact of each change are read;
    /// later messages in the same batch are dropped. Changes whose first
    /// message has no text body or no contact profile are skipped.
    pub fn inbound_messages(&self) -> Vec<InboundText> {
        let mut inbound = Vec::new();

        for entry in &self.entry {
            for change in &entry.changes {
                if change.field != "messages" {
                    continue;
                }
                let value = match &change.value {
                    Some(value) if !value.messages.is_empty() => value,
                    _ => continue,
                };

                if value.messages.len() > 1 {
                    debug!(
                        "Batch of {} messages, only the first is handled",
                        value.messages.len()
                    );
                }
                let message = &value.messages[0];

                let Some(text) = &message.text else {
                    warn!(
                        "Ignoring {} message from {} without a text body",
                        message.msg_type.as_deref().unwrap_or("unknown"),
                        message.from
                    );
                    continue;
                };
                let Some(profile) = value.contacts.first().and_then(|c| c.profile.as_ref())
                else {
                    warn!("Ignoring message from {} without a contact profile", message.from);
                    continue;
                };

                inbound.push(InboundText {
                    from: message.from.clone(),
                    name: profile.name.clone(),
                    body: text.body.clone(),
                });
            }
        }

        inbound
    }
}

/// Answer Meta's subscription challenge.
///
/// Returns the challenge when `mode` is `subscribe` and `token` matches the
/// configured verify token.
pub fn verify_webhook(
    mode: &str,
    token: &str,
    challenge: &str,
    verify_token: &str,
) -> Result<String> {
    if mode == "subscribe" && token == verify_token {
        info!("WEBHOOK_VERIFIED");
        Ok(challenge.to_string())
    } else {
        warn!("Webhook verification failed: invalid mode or token");
        Err(WhatsAppError::WebhookVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notification() -> &'static str {
        r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA_ID",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {"display_phone_number": "15550001111", "phone_number_id": "123"},
                        "contacts": [{"profile": {"name": "Ana"}, "wa_id": "5511999"}],
                        "messages": [{
                            "from": "5511999",
                            "id": "wamid.1",
                            "timestamp": "1700000000",
                            "type": "text",
                            "text": {"body": "hi"}
                        }]
                    }
                }]
            }]
        }"#
    }

    #[test]
    fn test_parse_and_extract() {
        let notification = WebhookNotification::parse(sample_notification()).unwrap();
        assert!(notification.is_business_account());

        let inbound = notification.inbound_messages();
        assert_eq!(
            inbound,
            vec![InboundText {
                from: "5511999".to_string(),
                name: "Ana".to_string(),
                body: "hi".to_string(),
            }]
        );
    }

    #[test]
    fn test_only_first_message_of_batch() {
        let payload = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"field": "messages", "value": {
                "contacts": [{"profile": {"name": "Ana"}}, {"profile": {"name": "Bia"}}],
                "messages": [
                    {"from": "5511999", "text": {"body": "first"}},
                    {"from": "5511888", "text": {"body": "second"}}
                ]
            }}]}]
        }"#;

        let inbound = WebhookNotification::parse(payload).unwrap().inbound_messages();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].body, "first");
        assert_eq!(inbound[0].name, "Ana");
    }

    #[test]
    fn test_each_change_is_handled() {
        let payload = r#"{
            "object": "whatsapp_business_account",
            "entry": [
                {"changes": [{"field": "messages", "value": {
                    "contacts": [{"profile": {"name": "Ana"}}],
                    "messages": [{"from": "5511999", "text": {"body": "one"}}]
                }}]},
                {"changes": [{"field": "messages", "value": {
                    "contacts": [{"profile": {"name": "Bia"}}],
                    "messages": [{"from": "5511888", "text": {"body": "two"}}]
                }}]}
            ]
        }"#;

        let inbound = WebhookNotification::parse(payload).unwrap().inbound_messages();
        assert_eq!(inbound.len(), 2);
        assert_eq!(inbound[1].from, "5511888");
    }

    #[test]
    fn test_status_updates_ignored() {
        let payload = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"field": "messages", "value": {
                "statuses": [{"id": "wamid.1", "status": "delivered"}]
            }}]}]
        }"#;

        let inbound = WebhookNotification::parse(payload).unwrap().inbound_messages();
        assert!(inbound.is_empty());
    }

    #[test]
    fn test_other_fields_ignored() {
        let payload = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"field": "account_update", "value": {
                "contacts": [{"profile": {"name": "Ana"}}],
                "messages": [{"from": "5511999", "text": {"body": "hi"}}]
            }}]}]
        }"#;

        let inbound = WebhookNotification::parse(payload).unwrap().inbound_messages();
        assert!(inbound.is_empty());
    }

    #[test]
    fn test_non_text_and_missing_profile_skipped() {
        let payload = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [
                {"field": "messages", "value": {
                    "contacts": [{"profile": {"name": "Ana"}}],
                    "messages": [{"from": "5511999", "type": "image", "image": {"id": "m1"}}]
                }},
                {"field": "messages", "value": {
                    "messages": [{"from": "5511888", "text": {"body": "hi"}}]
                }}
            ]}]
        }"#;

        let inbound = WebhookNotification::parse(payload).unwrap().inbound_messages();
        assert!(inbound.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            WebhookNotification::parse("not json"),
            Err(WhatsAppError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_verify_webhook() {
        assert_eq!(
            verify_webhook("subscribe", "secret", "1158201444", "secret").unwrap(),
            "1158201444"
        );
        assert!(verify_webhook("subscribe", "wrong", "1158201444", "secret").is_err());
        assert!(verify_webhook("unsubscribe", "secret", "1158201444", "secret").is_err());
    }
}
