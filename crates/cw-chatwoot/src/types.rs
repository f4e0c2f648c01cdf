//! Chatwoot API and webhook types

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// REST API
// =============================================================================

/// Contact as returned by the contacts list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatwootContact {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContactListResponse {
    #[serde(default)]
    pub payload: Vec<ChatwootContact>,
}

/// Body of the contact create call
#[derive(Debug, Clone, Serialize)]
pub struct NewContact {
    pub inbox_id: u64,
    pub name: String,
    pub phone_number: String,
    pub identifier: String,
    pub custom_attributes: CustomAttributes,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomAttributes {
    #[serde(rename = "type")]
    pub kind: String,
}

impl CustomAttributes {
    pub fn customer() -> Self {
        Self {
            kind: "customer".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateContactResponse {
    pub payload: CreatedContactPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedContactPayload {
    pub contact: CreatedContact,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedContact {
    pub id: u64,
}

/// Conversation status accepted on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Resolved,
    Pending,
}

/// Options applied when a conversation is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationOptions {
    pub status: Option<ConversationStatus>,
}

impl ConversationOptions {
    pub fn open() -> Self {
        Self {
            status: Some(ConversationStatus::Open),
        }
    }
}

/// Body of the conversation create call
#[derive(Debug, Clone, Serialize)]
pub struct NewConversation {
    pub inbox_id: u64,
    pub contact_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationResponse {
    pub id: u64,
}

/// Contact and conversation a message was posted to. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteConversationRef {
    pub contact_id: u64,
    pub conversation_id: u64,
}

/// Body of the message create call
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub content: String,
    pub message_type: String,
    pub private: bool,
}

impl NewMessage {
    /// Public outgoing message
    pub fn outgoing(content: &str) -> Self {
        Self {
            content: content.to_string(),
            message_type: "outgoing".to_string(),
            private: false,
        }
    }
}

// =============================================================================
// Webhooks
// =============================================================================

/// Event delivered to the Chatwoot webhook endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatwootWebhookEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub message: Option<ChatwootWebhookMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatwootWebhookMessage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
    /// `"incoming"` in webhooks; some Chatwoot versions send the numeric enum
    #[serde(default)]
    pub message_type: Value,
    #[serde(default)]
    pub sender: Option<ChatwootSender>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatwootSender {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl ChatwootWebhookEvent {
    pub fn is_message_created(&self) -> bool {
        self.event == "message_created"
    }
}

impl ChatwootWebhookMessage {
    pub fn is_incoming(&self) -> bool {
        match &self.message_type {
            Value::String(s) => s == "incoming",
            Value::Number(n) => n.as_u64() == Some(0),
            _ => false,
        }
    }

    pub fn sender_phone(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .and_then(|s| s.phone_number.as_deref())
            .filter(|p| !p.is_empty())
    }
}
