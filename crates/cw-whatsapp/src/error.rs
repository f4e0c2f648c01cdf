//! Error types for cw-whatsapp

use thiserror::Error;

/// cw-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("WhatsApp API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Webhook verification failed")]
    WebhookVerificationFailed,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

impl From<WhatsAppError> for cw_core::Error {
    fn from(err: WhatsAppError) -> Self {
        match err {
            WhatsAppError::Api { status, body } => cw_core::Error::RemoteApi {
                service: "whatsapp",
                status: Some(status),
                body,
            },
            WhatsAppError::WebhookVerificationFailed | WhatsAppError::InvalidPayload(_) => {
                cw_core::Error::Validation(err.to_string())
            }
            other => cw_core::Error::remote("whatsapp", other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
