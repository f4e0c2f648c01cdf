//! Contact resolution and conversation routing on the Chatwoot side
//!
//! Every mirrored message goes through the same chain: make sure the
//! contact exists, open a fresh conversation, post the message. Nothing is
//! cached between calls, so each message produces a new conversation.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use cw_core::{ContactDirectory, InboxGateway};

use crate::api::ChatwootApi;
use crate::error::{ChatwootError, Result};
use crate::types::{
    ConversationOptions, CustomAttributes, NewContact, NewConversation, NewMessage,
    RemoteConversationRef,
};

/// Format a phone number as E.164 by adding the leading `+` when absent
pub fn to_e164(phone: &str) -> String {
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{}", phone)
    }
}

/// Chatwoot gateway
#[derive(Clone)]
pub struct ChatwootGateway {
    api: ChatwootApi,
    directory: ContactDirectory,
}

impl ChatwootGateway {
    pub fn new(api: ChatwootApi, directory: ContactDirectory) -> Self {
        Self { api, directory }
    }

    /// Id of the inbox contact whose phone number equals the E.164 form of `phone`
    pub async fn find_contact_by_phone(&self, phone: &str) -> Result<Option<u64>> {
        let formatted = to_e164(phone);
        let contacts = self.api.list_contacts().await?;

        Ok(contacts
            .iter()
            .find(|c| c.phone_number.as_deref() == Some(formatted.as_str()))
            .map(|c| c.id))
    }

    /// Return the existing contact id for `phone`, creating the contact if needed
    pub async fn ensure_contact(&self, phone: &str, name: &str) -> Result<u64> {
        if let Some(contact_id) = self.find_contact_by_phone(phone).await? {
            info!("Contact already exists");
            return Ok(contact_id);
        }

        let contact = NewContact {
            inbox_id: self.api.inbox_id(),
            name: name.to_string(),
            phone_number: to_e164(phone),
            identifier: phone.to_string(),
            custom_attributes: CustomAttributes::customer(),
        };

        let contact_id = self.api.create_contact(&contact).await?;
        info!("Created Chatwoot contact {} for {}", contact_id, phone);
        Ok(contact_id)
    }

    /// Create a new conversation for `contact_id`. Prior conversations are never reused.
    pub async fn ensure_conversation(
        &self,
        contact_id: u64,
        opts: ConversationOptions,
    ) -> Result<RemoteConversationRef> {
        let conversation = NewConversation {
            inbox_id: self.api.inbox_id(),
            contact_id,
            status: opts.status,
        };

        let conversation_id = self.api.create_conversation(&conversation).await?;
        debug!(
            "Opened conversation {} for contact {}",
            conversation_id, contact_id
        );

        Ok(RemoteConversationRef {
            contact_id,
            conversation_id,
        })
    }

    /// Post a public outgoing message to a conversation
    pub async fn post_message(&self, conversation_id: u64, content: &str) -> Result<Value> {
        self.api
            .create_message(conversation_id, &NewMessage::outgoing(content))
            .await
    }

    /// Mirror an inbound message for a phone already in the contact directory
    pub async fn relay_inbound_to_chatwoot(&self, phone: &str, content: &str) -> Result<Value> {
        let contact = self
            .directory
            .get(phone)
            .await
            .ok_or_else(|| ChatwootError::ContactNotRegistered(phone.to_string()))?;

        self.deliver(phone, &contact.name, content, ConversationOptions::default())
            .await
            .inspect_err(|e| error!("Error sending message to Chatwoot: {}", e))
    }

    /// Open a conversation (`status: open`) and post the first message to it
    pub async fn start_conversation(
        &self,
        phone: &str,
        name: &str,
        initial_message: &str,
    ) -> Result<Value> {
        self.deliver(phone, name, initial_message, ConversationOptions::open())
            .await
            .inspect_err(|e| error!("Error initiating Chatwoot conversation: {}", e))
    }

    /// `start_conversation` with the name taken from the contact directory
    pub async fn initiate(&self, phone: &str, initial_message: &str) -> Result<Value> {
        let contact = self
            .directory
            .get(phone)
            .await
            .ok_or_else(|| ChatwootError::ContactNotRegistered(phone.to_string()))
            .inspect_err(|e| error!("Error initiating Chatwoot conversation: {}", e))?;

        self.start_conversation(phone, &contact.name, initial_message)
            .await
    }

    async fn deliver(
        &self,
        phone: &str,
        name: &str,
        content: &str,
        opts: ConversationOptions,
    ) -> Result<Value> {
        let contact_id = self.ensure_contact(phone, name).await?;
        let conversation = self.ensure_conversation(contact_id, opts).await?;
        self.post_message(conversation.conversation_id, content)
            .await
    }
}

#[async_trait]
impl InboxGateway for ChatwootGateway {
    async fn relay_inbound(&self, phone: &str, content: &str) -> cw_core::Result<Value> {
        Ok(self.relay_inbound_to_chatwoot(phone, content).await?)
    }

    async fn start_conversation(&self, phone: &str, message: &str) -> cw_core::Result<Value> {
        Ok(self.initiate(phone, message).await?)
    }
}
