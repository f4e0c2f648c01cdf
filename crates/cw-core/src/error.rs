//! Error types for cw-core

use thiserror::Error;

/// Main error type shared by the gateways and the dispatcher
#[derive(Error, Debug)]
pub enum Error {
    #[error("Contact not found in stored contacts: {0}")]
    ContactNotRegistered(String),

    #[error("{service} API error ({}): {body}", status_label(.status))]
    RemoteApi {
        service: &'static str,
        status: Option<u16>,
        body: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a remote error that carries no HTTP status (network failure, bad body)
    pub fn remote(service: &'static str, body: impl Into<String>) -> Self {
        Self::RemoteApi {
            service,
            status: None,
            body: body.into(),
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |s| s.to_string())
}

/// Result type alias for cw-core
pub type Result<T> = std::result::Result<T, Error>;
