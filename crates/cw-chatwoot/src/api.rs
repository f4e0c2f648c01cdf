//! Chatwoot REST API client
//!
//! Thin wrapper over the account-scoped contacts, conversations and
//! messages endpoints.

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{ChatwootError, Result};
use crate::types::*;

/// Chatwoot REST API client
#[derive(Debug, Clone)]
pub struct ChatwootApi {
    client: Client,
    base_url: String,
    api_token: String,
    account_id: u64,
    inbox_id: u64,
}

impl ChatwootApi {
    /// Create a client for one account and inbox
    pub fn new(base_url: &str, api_token: &str, account_id: u64, inbox_id: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(ChatwootError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            account_id,
            inbox_id,
        })
    }

    /// Create a client from the `[chatwoot]` config section
    pub fn from_config(config: &cw_core::ChatwootConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.api_token,
            config.account_id,
            config.inbox_id,
        )
    }

    pub fn inbox_id(&self) -> u64 {
        self.inbox_id
    }

    fn account_url(&self, path: &str) -> String {
        format!(
            "{}/api/v1/accounts/{}/{}",
            self.base_url, self.account_id, path
        )
    }

    /// Add the access token and content type headers
    fn add_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("api_access_token", &self.api_token)
            .header("Content-Type", "application/json; charset=utf-8")
    }

    /// Turn a non-2xx response into an error, logging its body
    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Error {}: {} - {}", action, status, body);
        Err(ChatwootError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// List the contacts of the configured inbox (first page only)
    pub async fn list_contacts(&self) -> Result<Vec<ChatwootContact>> {
        let url = self.account_url("contacts");
        debug!("Listing contacts for inbox {}", self.inbox_id);

        let response = self
            .add_auth(self.client.get(&url))
            .query(&[("inbox_id", self.inbox_id)])
            .send()
            .await
            .inspect_err(|e| error!("Error listing contacts: {}", e))?;
        let response = Self::check(response, "listing contacts").await?;

        let list: ContactListResponse = response
            .json()
            .await
            .map_err(|e| ChatwootError::Parse(e.to_string()))?;
        Ok(list.payload)
    }

    /// Create a contact, returning its id
    pub async fn create_contact(&self, contact: &NewContact) -> Result<u64> {
        let url = self.account_url("contacts");
        debug!("Creating contact {}", contact.phone_number);

        let response = self
            .add_auth(self.client.post(&url))
            .json(contact)
            .send()
            .await
            .inspect_err(|e| error!("Error creating contact: {}", e))?;
        let response = Self::check(response, "creating contact").await?;

        let created: CreateContactResponse = response
            .json()
            .await
            .map_err(|e| ChatwootError::Parse(e.to_string()))?;
        Ok(created.payload.contact.id)
    }

    /// Create a conversation, returning its id
    pub async fn create_conversation(&self, conversation: &NewConversation) -> Result<u64> {
        let url = self.account_url("conversations");
        debug!("Creating conversation for contact {}", conversation.contact_id);

        let response = self
            .add_auth(self.client.post(&url))
            .json(conversation)
            .send()
            .await
            .inspect_err(|e| error!("Error creating conversation: {}", e))?;
        let response = Self::check(response, "creating conversation").await?;

        let created: ConversationResponse = response
            .json()
            .await
            .map_err(|e| ChatwootError::Parse(e.to_string()))?;
        Ok(created.id)
    }

    /// Post a message to a conversation, returning the created message verbatim
    pub async fn create_message(
        &self,
        conversation_id: u64,
        message: &NewMessage,
    ) -> Result<Value> {
        let url = self.account_url(&format!("conversations/{}/messages", conversation_id));
        debug!("Posting message to conversation {}", conversation_id);

        let response = self
            .add_auth(self.client.post(&url))
            .json(message)
            .send()
            .await
            .inspect_err(|e| error!("Error sending message: {}", e))?;
        let response = Self::check(response, "sending message").await?;

        response
            .json()
            .await
            .map_err(|e| ChatwootError::Parse(e.to_string()))
    }
}
