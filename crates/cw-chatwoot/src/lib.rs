//! cw-chatwoot: Chatwoot side of the bridge
//!
//! [`ChatwootApi`] speaks the REST contract. [`ChatwootGateway`] builds the
//! find-or-create contact, new conversation, post message chain on top of it
//! and implements [`cw_core::InboxGateway`].

pub mod api;
pub mod error;
pub mod gateway;
pub mod types;

pub use api::ChatwootApi;
pub use error::{ChatwootError, Result};
pub use gateway::{ChatwootGateway, to_e164};
pub use types::{
    ChatwootContact, ChatwootWebhookEvent, ChatwootWebhookMessage, ConversationOptions,
    ConversationStatus, RemoteConversationRef,
};
