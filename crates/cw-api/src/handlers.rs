//! HTTP handlers
//!
//! Webhook receivers always acknowledge once the body is parsed, so the
//! platforms never redeliver because of an internal failure. The operator
//! endpoints report failures as 400/500.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use cw_chatwoot::ChatwootWebhookEvent;
use cw_core::ContactRecord;
use cw_whatsapp::{WebhookNotification, WhatsAppError, verify_webhook};

use crate::error::{ApiError, Result};
use crate::server::AppState;

// ============================================================================
// Request types
// ============================================================================

/// Query string Meta sends when subscribing the webhook
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// `/send_message` body
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub recipient_id: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// `/initiate_conversation` body
#[derive(Debug, Default, Deserialize)]
pub struct InitiateConversationRequest {
    #[serde(default)]
    pub phone_number: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Non-empty string or number field as text; anything else counts as missing
fn text_field(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an operator request body leniently.
///
/// An empty, non-JSON or mistyped body reads as the default request, so the
/// handler answers with its own validation error instead of a 415/422.
fn operator_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!("Unparseable request body: {}", e);
        T::default()
    })
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /webhook`: Meta subscription challenge
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String> {
    let (Some(mode), Some(token)) = (query.mode.as_deref(), query.verify_token.as_deref()) else {
        return Err(ApiError::BadRequest(
            "hub.mode and hub.verify_token are required".to_string(),
        ));
    };

    let challenge = query.challenge.as_deref().unwrap_or_default();
    verify_webhook(mode, token, challenge, &state.verify_token).map_err(|e| match e {
        WhatsAppError::WebhookVerificationFailed => ApiError::Forbidden,
        other => ApiError::BadRequest(other.to_string()),
    })
}

/// `POST /webhook`: Meta notification
pub async fn meta_webhook(State(state): State<AppState>, Json(body): Json<Value>) -> StatusCode {
    debug!("Webhook received data: {}", body);

    match serde_json::from_value::<WebhookNotification>(body) {
        Ok(notification) => {
            let report = state.dispatcher.handle_meta_event(&notification).await;
            debug!(
                "Meta webhook handled: {} processed, {} failed",
                report.processed, report.failed
            );
        }
        Err(e) => warn!("Unrecognized Meta webhook body: {}", e),
    }

    StatusCode::OK
}

/// `POST /chatwoot-webhook`: Chatwoot event
pub async fn chatwoot_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    debug!("Webhook received data: {}", body);

    match serde_json::from_value::<ChatwootWebhookEvent>(body) {
        Ok(event) => {
            state.dispatcher.handle_chatwoot_event(&event).await;
        }
        Err(e) => warn!("Unrecognized Chatwoot webhook body: {}", e),
    }

    Json(json!({ "status": "success" }))
}

/// `POST /send_message`: operator send to a WhatsApp user, mirrored into Chatwoot
pub async fn send_message(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req: SendMessageRequest = operator_body(&body);
    debug!("Received data: {:?}", req);

    let (Some(recipient_id), Some(message)) =
        (text_field(&req.recipient_id), text_field(&req.message))
    else {
        error!("recipient_id and message are required");
        return Err(ApiError::Validation(
            "recipient_id and message are required".to_string(),
        ));
    };

    let response = state
        .dispatcher
        .send_operator_message(&recipient_id, &message)
        .await?;
    Ok(Json(response))
}

/// `POST /initiate_conversation`: open a Chatwoot conversation for a known contact
pub async fn initiate_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>> {
    let req: InitiateConversationRequest = operator_body(&body);
    debug!("Received data: {:?}", req);

    let (Some(phone_number), Some(message)) =
        (text_field(&req.phone_number), text_field(&req.message))
    else {
        error!("phone_number and message are required");
        return Err(ApiError::Validation(
            "phone_number and message are required".to_string(),
        ));
    };

    let response = state
        .dispatcher
        .initiate_conversation(&phone_number, &message)
        .await?;
    Ok(Json(response))
}

/// `GET /contacts`: dump the contact directory
pub async fn contacts(State(state): State<AppState>) -> Json<HashMap<String, ContactRecord>> {
    Json(state.dispatcher.directory().snapshot().await)
}
