//! Webhook dispatcher
//!
//! Routes events from both platforms to the gateways. The two inbound paths
//! share nothing but the gateways; each delivery is handled on its own.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use cw_chatwoot::ChatwootWebhookEvent;
use cw_core::{ContactDirectory, InboxGateway, MessagingGateway, Result};
use cw_whatsapp::{InboundText, WebhookNotification};

/// Outcome of one webhook delivery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub processed: usize,
    pub failed: usize,
}

/// Dispatches inbound webhook events to the messaging and inbox gateways
#[derive(Clone)]
pub struct WebhookDispatcher {
    messaging: Arc<dyn MessagingGateway>,
    inbox: Arc<dyn InboxGateway>,
    directory: ContactDirectory,
    auto_reply: String,
}

impl WebhookDispatcher {
    pub fn new(
        messaging: Arc<dyn MessagingGateway>,
        inbox: Arc<dyn InboxGateway>,
        directory: ContactDirectory,
        auto_reply: impl Into<String>,
    ) -> Self {
        Self {
            messaging,
            inbox,
            directory,
            auto_reply: auto_reply.into(),
        }
    }

    pub fn directory(&self) -> &ContactDirectory {
        &self.directory
    }

    /// Handle a Meta notification: record the sender, auto-reply, mirror into Chatwoot.
    ///
    /// Failures are logged and counted, never returned.
    pub async fn handle_meta_event(&self, notification: &WebhookNotification) -> DispatchReport {
        let mut report = DispatchReport::default();

        if !notification.is_business_account() {
            debug!("Ignoring webhook for object {:?}", notification.object);
            return report;
        }

        for inbound in notification.inbound_messages() {
            match self.handle_message_from_meta(&inbound).await {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    error!("Error handling message from Meta: {}", e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn handle_message_from_meta(&self, inbound: &InboundText) -> Result<()> {
        info!(
            "Contact Name: {}, Phone Number: {}",
            inbound.name, inbound.from
        );

        self.directory.upsert(&inbound.from, &inbound.name).await;

        self.messaging.send(&inbound.from, &self.auto_reply).await?;
        self.inbox.relay_inbound(&inbound.from, &inbound.body).await?;

        Ok(())
    }

    /// Handle a Chatwoot event: auto-reply to incoming messages on WhatsApp.
    ///
    /// Nothing is mirrored back into Chatwoot and the directory is not touched.
    pub async fn handle_chatwoot_event(&self, event: &ChatwootWebhookEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        let message = match &event.message {
            Some(message) if event.is_message_created() && message.is_incoming() => message,
            _ => {
                debug!("Ignoring Chatwoot event {:?}", event.event);
                return report;
            }
        };

        let Some(phone) = message.sender_phone() else {
            warn!("Incoming Chatwoot message without a sender phone number");
            report.failed += 1;
            return report;
        };

        match self.messaging.send(phone, &self.auto_reply).await {
            Ok(response) => {
                info!("Message sent to WhatsApp: {}", response);
                report.processed += 1;
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                report.failed += 1;
            }
        }

        report
    }

    /// Operator-triggered send: deliver on WhatsApp, then mirror into Chatwoot.
    ///
    /// Returns the WhatsApp response. The mirror needs `recipient` to be in
    /// the directory; when it is not, the send has already happened and the
    /// mirror error is returned.
    pub async fn send_operator_message(&self, recipient: &str, message: &str) -> Result<Value> {
        let response = self.messaging.send(recipient, message).await?;
        debug!("Received response: {}", response);

        self.inbox.relay_inbound(recipient, message).await?;
        Ok(response)
    }

    /// Operator-triggered outreach: open a Chatwoot conversation for a known contact
    pub async fn initiate_conversation(&self, phone: &str, message: &str) -> Result<Value> {
        self.inbox.start_conversation(phone, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingInbox, RecordingMessenger};

    const AUTO_REPLY: &str = "Obrigado pela sua mensagem!";

    fn dispatcher(
        messenger: &Arc<RecordingMessenger>,
        inbox: &Arc<RecordingInbox>,
    ) -> WebhookDispatcher {
        WebhookDispatcher::new(
            messenger.clone(),
            inbox.clone(),
            ContactDirectory::in_memory(),
            AUTO_REPLY,
        )
    }

    fn notification(json: &str) -> WebhookNotification {
        WebhookNotification::parse(json).unwrap()
    }

    fn chatwoot_event(value: Value) -> ChatwootWebhookEvent {
        serde_json::from_value(value).unwrap()
    }

    const ANA_SAYS_HI: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{"changes": [{"field": "messages", "value": {
            "messages": [{"from": "5511999", "text": {"body": "hi"}}],
            "contacts": [{"profile": {"name": "Ana"}}]
        }}]}]
    }"#;

    #[tokio::test]
    async fn test_meta_message_is_recorded_answered_and_mirrored() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let report = dispatcher.handle_meta_event(&notification(ANA_SAYS_HI)).await;
        assert_eq!(report, DispatchReport { processed: 1, failed: 0 });

        let contacts = dispatcher.directory().snapshot().await;
        assert_eq!(contacts.len(), 1);
        let ana = &contacts["5511999"];
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.phone, "5511999");

        assert_eq!(
            messenger.sent(),
            vec![("5511999".to_string(), AUTO_REPLY.to_string())]
        );
        assert_eq!(
            inbox.relayed(),
            vec![("5511999".to_string(), "hi".to_string())]
        );
    }

    #[tokio::test]
    async fn test_meta_other_object_has_no_effect() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let json = ANA_SAYS_HI.replace("whatsapp_business_account", "page");
        let report = dispatcher.handle_meta_event(&notification(&json)).await;

        assert_eq!(report, DispatchReport::default());
        assert!(dispatcher.directory().is_empty().await);
        assert!(messenger.sent().is_empty());
        assert!(inbox.relayed().is_empty());
    }

    #[tokio::test]
    async fn test_meta_batch_only_first_message() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let json = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"field": "messages", "value": {
                "messages": [
                    {"from": "5511999", "text": {"body": "first"}},
                    {"from": "5511999", "text": {"body": "second"}}
                ],
                "contacts": [{"profile": {"name": "Ana"}}]
            }}]}]
        }"#;
        dispatcher.handle_meta_event(&notification(json)).await;

        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(
            inbox.relayed(),
            vec![("5511999".to_string(), "first".to_string())]
        );
    }

    #[tokio::test]
    async fn test_meta_failed_auto_reply_skips_mirror() {
        let messenger = Arc::new(RecordingMessenger::failing());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let report = dispatcher.handle_meta_event(&notification(ANA_SAYS_HI)).await;

        assert_eq!(report, DispatchReport { processed: 0, failed: 1 });
        assert!(dispatcher.directory().get("5511999").await.is_some());
        assert!(inbox.relayed().is_empty());
    }

    #[tokio::test]
    async fn test_meta_failed_mirror_is_counted() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::failing());
        let dispatcher = dispatcher(&messenger, &inbox);

        let report = dispatcher.handle_meta_event(&notification(ANA_SAYS_HI)).await;

        assert_eq!(report, DispatchReport { processed: 0, failed: 1 });
        assert_eq!(messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_meta_latest_name_wins() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        dispatcher.handle_meta_event(&notification(ANA_SAYS_HI)).await;
        let renamed = ANA_SAYS_HI.replace("\"Ana\"", "\"Ana Paula\"");
        dispatcher.handle_meta_event(&notification(&renamed)).await;

        let record = dispatcher.directory().get("5511999").await.unwrap();
        assert_eq!(record.name, "Ana Paula");
    }

    #[tokio::test]
    async fn test_chatwoot_incoming_gets_single_auto_reply() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let event = chatwoot_event(serde_json::json!({
            "event": "message_created",
            "message": {
                "content": "Preciso de ajuda",
                "message_type": "incoming",
                "sender": {"phone_number": "5511999"}
            }
        }));
        let report = dispatcher.handle_chatwoot_event(&event).await;

        assert_eq!(report, DispatchReport { processed: 1, failed: 0 });
        assert_eq!(
            messenger.sent(),
            vec![("5511999".to_string(), AUTO_REPLY.to_string())]
        );
        assert!(inbox.relayed().is_empty());
        assert!(inbox.started().is_empty());
        assert!(dispatcher.directory().is_empty().await);
    }

    #[tokio::test]
    async fn test_chatwoot_other_events_ignored() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let outgoing = chatwoot_event(serde_json::json!({
            "event": "message_created",
            "message": {"message_type": "outgoing", "sender": {"phone_number": "5511999"}}
        }));
        let updated = chatwoot_event(serde_json::json!({
            "event": "conversation_updated",
            "message": {"message_type": "incoming", "sender": {"phone_number": "5511999"}}
        }));

        dispatcher.handle_chatwoot_event(&outgoing).await;
        dispatcher.handle_chatwoot_event(&updated).await;
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_chatwoot_missing_phone() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let event = chatwoot_event(serde_json::json!({
            "event": "message_created",
            "message": {"message_type": "incoming", "sender": {"name": "Ana"}}
        }));

        let report = dispatcher.handle_chatwoot_event(&event).await;
        assert_eq!(report, DispatchReport { processed: 0, failed: 1 });
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_operator_send_mirrors_and_returns_remote_body() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        let response = dispatcher
            .send_operator_message("5511999", "Seu pedido saiu")
            .await
            .unwrap();

        assert_eq!(response["messages"][0]["id"], "wamid.test");
        assert_eq!(
            inbox.relayed(),
            vec![("5511999".to_string(), "Seu pedido saiu".to_string())]
        );
    }

    #[tokio::test]
    async fn test_initiate_conversation_delegates() {
        let messenger = Arc::new(RecordingMessenger::default());
        let inbox = Arc::new(RecordingInbox::default());
        let dispatcher = dispatcher(&messenger, &inbox);

        dispatcher
            .initiate_conversation("5511999", "Olá!")
            .await
            .unwrap();

        assert_eq!(
            inbox.started(),
            vec![("5511999".to_string(), "Olá!".to_string())]
        );
        assert!(messenger.sent().is_empty());
    }
}
