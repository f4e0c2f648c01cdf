//! Contact storage backends

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::ContactRecord;

/// Storage behind the contact directory
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert or overwrite the record for `record.phone`
    async fn put(&self, record: ContactRecord);

    /// Look up a record by raw phone number
    async fn get(&self, phone: &str) -> Option<ContactRecord>;

    /// Copy of every stored record, keyed by phone
    async fn all(&self) -> HashMap<String, ContactRecord>;

    /// Number of stored records
    async fn len(&self) -> usize;
}

/// Process-lifetime contact store
#[derive(Debug, Default, Clone)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<HashMap<String, ContactRecord>>>,
}

impl InMemoryContactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn put(&self, record: ContactRecord) {
        let mut contacts = self.contacts.write().await;
        contacts.insert(record.phone.clone(), record);
    }

    async fn get(&self, phone: &str) -> Option<ContactRecord> {
        let contacts = self.contacts.read().await;
        contacts.get(phone).cloned()
    }

    async fn all(&self) -> HashMap<String, ContactRecord> {
        let contacts = self.contacts.read().await;
        contacts.clone()
    }

    async fn len(&self) -> usize {
        let contacts = self.contacts.read().await;
        contacts.len()
    }
}
