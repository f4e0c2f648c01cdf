//! Recording fakes of the gateway traits, for tests

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use cw_core::{Error, InboxGateway, MessagingGateway, Result};

type Calls = Mutex<Vec<(String, String)>>;

fn push(calls: &Calls, a: &str, b: &str) {
    calls
        .lock()
        .expect("calls lock poisoned")
        .push((a.to_string(), b.to_string()));
}

fn snapshot(calls: &Calls) -> Vec<(String, String)> {
    calls.lock().expect("calls lock poisoned").clone()
}

/// Messaging gateway that records every send
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Calls,
    fail: bool,
}

impl RecordingMessenger {
    /// A messenger whose sends are recorded and then fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(recipient, text)` for every send, in call order
    pub fn sent(&self) -> Vec<(String, String)> {
        snapshot(&self.sent)
    }
}

#[async_trait]
impl MessagingGateway for RecordingMessenger {
    async fn send(&self, recipient: &str, text: &str) -> Result<Value> {
        push(&self.sent, recipient, text);
        if self.fail {
            return Err(Error::RemoteApi {
                service: "whatsapp",
                status: Some(500),
                body: "send failed".to_string(),
            });
        }
        Ok(json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": recipient, "wa_id": recipient}],
            "messages": [{"id": "wamid.test"}]
        }))
    }
}

/// Inbox gateway that records relays and conversation starts
#[derive(Debug, Default)]
pub struct RecordingInbox {
    relayed: Calls,
    started: Calls,
    fail: bool,
}

impl RecordingInbox {
    /// An inbox whose calls are recorded and then fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(phone, content)` for every relay, in call order
    pub fn relayed(&self) -> Vec<(String, String)> {
        snapshot(&self.relayed)
    }

    /// `(phone, message)` for every conversation start, in call order
    pub fn started(&self) -> Vec<(String, String)> {
        snapshot(&self.started)
    }
}

#[async_trait]
impl InboxGateway for RecordingInbox {
    async fn relay_inbound(&self, phone: &str, content: &str) -> Result<Value> {
        push(&self.relayed, phone, content);
        if self.fail {
            return Err(Error::ContactNotRegistered(phone.to_string()));
        }
        Ok(json!({"id": 900, "content": content}))
    }

    async fn start_conversation(&self, phone: &str, message: &str) -> Result<Value> {
        push(&self.started, phone, message);
        if self.fail {
            return Err(Error::ContactNotRegistered(phone.to_string()));
        }
        Ok(json!({"id": 901, "content": message}))
    }
}
