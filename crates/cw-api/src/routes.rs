//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{
    chatwoot_webhook, contacts, health, initiate_conversation, meta_webhook, send_message, verify,
};
use crate::server::AppState;

/// Create the relay router
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Meta webhook: subscription challenge and notifications
        .route("/webhook", get(verify).post(meta_webhook))
        .route("/chatwoot-webhook", post(chatwoot_webhook))
        // Operator endpoints
        .route("/send_message", post(send_message))
        .route("/initiate_conversation", post(initiate_conversation))
        .route("/contacts", get(contacts))
}
