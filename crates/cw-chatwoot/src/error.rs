//! Error types for cw-chatwoot

use thiserror::Error;

/// cw-chatwoot error type
#[derive(Error, Debug)]
pub enum ChatwootError {
    #[error("Contact not found in stored contacts: {0}")]
    ContactNotRegistered(String),

    #[error("Chatwoot API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<ChatwootError> for cw_core::Error {
    fn from(err: ChatwootError) -> Self {
        match err {
            ChatwootError::ContactNotRegistered(phone) => {
                cw_core::Error::ContactNotRegistered(phone)
            }
            ChatwootError::Api { status, body } => cw_core::Error::RemoteApi {
                service: "chatwoot",
                status: Some(status),
                body,
            },
            other => cw_core::Error::remote("chatwoot", other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ChatwootError>;
