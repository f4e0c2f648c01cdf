//! WhatsApp Cloud API client
//!
//! Sends text messages through the Meta Graph API send endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use cw_core::MessagingGateway;

use crate::error::{Result, WhatsAppError};

/// A text message addressed to one WhatsApp user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub body: String,
}

impl OutboundMessage {
    pub fn new(recipient: &str, body: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            body: body.to_string(),
        }
    }

    fn payload(&self) -> SendMessagePayload<'_> {
        SendMessagePayload {
            messaging_product: "whatsapp",
            to: &self.recipient,
            kind: "text",
            text: TextBody { body: &self.body },
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

/// WhatsApp Cloud API client
#[derive(Debug, Clone)]
pub struct CloudApiClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl CloudApiClient {
    /// Create a client posting to `api_url` with the given bearer token
    pub fn new(api_url: &str, api_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(WhatsAppError::Http)?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Create a client from the `[meta]` config section
    pub fn from_config(config: &cw_core::MetaConfig) -> Result<Self> {
        Self::new(&config.api_url, &config.api_token)
    }

    /// Send a message, returning the Graph API response verbatim
    pub async fn send_message(&self, message: &OutboundMessage) -> Result<Value> {
        let payload = message.payload();
        debug!(
            "Sending payload {} to {}",
            serde_json::to_string(&payload).unwrap_or_default(),
            self.api_url
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("WhatsApp send failed: {} - {}", status, body);
            return Err(WhatsAppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WhatsAppError::Parse(e.to_string()))?;

        info!("Message sent to WhatsApp user {}", message.recipient);
        debug!("Send response: {}", body);
        Ok(body)
    }

    /// Send plain text to `recipient`
    pub async fn send_text(&self, recipient: &str, text: &str) -> Result<Value> {
        self.send_message(&OutboundMessage::new(recipient, text)).await
    }
}

#[async_trait]
impl MessagingGateway for CloudApiClient {
    async fn send(&self, recipient: &str, text: &str) -> cw_core::Result<Value> {
        Ok(self.send_text(recipient, text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_payload_shape() {
        let message = OutboundMessage::new("5511999", "Obrigado pela sua mensagem!");
        let payload = serde_json::to_value(message.payload()).unwrap();

        assert_eq!(
            payload,
            json!({
                "messaging_product": "whatsapp",
                "to": "5511999",
                "type": "text",
                "text": {"body": "Obrigado pela sua mensagem!"}
            })
        );
    }

    #[tokio::test]
    async fn test_send_posts_payload_with_bearer() {
        let server = MockServer::start().await;
        let reply = json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "5511999", "wa_id": "5511999"}],
            "messages": [{"id": "wamid.HBgM"}]
        });

        Mock::given(method("POST"))
            .and(path("/v18.0/123/messages"))
            .and(header("authorization", "Bearer meta-token"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "to": "5511999",
                "type": "text",
                "text": {"body": "hi"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v18.0/123/messages", server.uri());
        let client = CloudApiClient::new(&url, "meta-token").unwrap();

        let body = client.send("5511999", "hi").await.unwrap();
        assert_eq!(body, reply);
    }

    #[tokio::test]
    async fn test_send_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":{"code":190}}"#),
            )
            .mount(&server)
            .await;

        let client = CloudApiClient::new(&server.uri(), "expired").unwrap();

        match client.send_text("5511999", "hi").await {
            Err(WhatsAppError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("190"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gateway_error_maps_to_remote_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = CloudApiClient::new(&server.uri(), "token").unwrap();
        let err = MessagingGateway::send(&client, "5511999", "hi")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            cw_core::Error::RemoteApi {
                service: "whatsapp",
                status: Some(500),
                ..
            }
        ));
    }
}
