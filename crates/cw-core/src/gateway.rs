//! Seams between the dispatcher and the two remote platforms

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Sends text messages to the messaging platform (WhatsApp)
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send `text` to `recipient`, returning the remote response body verbatim
    async fn send(&self, recipient: &str, text: &str) -> Result<Value>;
}

/// Mirrors messages into the inbox platform (Chatwoot)
#[async_trait]
pub trait InboxGateway: Send + Sync {
    /// Mirror `content` into a new conversation for a registered phone number
    async fn relay_inbound(&self, phone: &str, content: &str) -> Result<Value>;

    /// Open a conversation for a registered phone number and post `message` to it
    async fn start_conversation(&self, phone: &str, message: &str) -> Result<Value>;
}
