//! cw-core: shared pieces of the WhatsApp ↔ Chatwoot bridge
//!
//! Configuration, the error type, the contact directory and the gateway
//! traits that the dispatcher talks through.

pub mod config;
pub mod contacts;
pub mod error;
pub mod gateway;

pub use config::{ChatwootConfig, Config, MetaConfig, RelayConfig, ServerConfig};
pub use contacts::{ContactDirectory, ContactRecord, ContactStore, InMemoryContactStore};
pub use error::{Error, Result};
pub use gateway::{InboxGateway, MessagingGateway};
