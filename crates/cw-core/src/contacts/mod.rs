//! Contact directory
//!
//! Maps the raw phone number seen on the messaging platform to the contact
//! name from its profile. Filled by inbound messages, read when mirroring
//! into the inbox platform.

pub mod store;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

pub use store::{ContactStore, InMemoryContactStore};
pub use types::ContactRecord;

/// Contact directory over an injected store
#[derive(Clone)]
pub struct ContactDirectory {
    store: Arc<dyn ContactStore>,
}

impl ContactDirectory {
    /// Create a directory backed by `store`
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Create a directory backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryContactStore::new()))
    }

    /// Insert or overwrite the record for `phone`
    pub async fn upsert(&self, phone: &str, name: &str) {
        debug!("Storing contact {} ({})", phone, name);
        self.store.put(ContactRecord::new(phone, name)).await;
    }

    /// Look up the record for `phone`
    pub async fn get(&self, phone: &str) -> Option<ContactRecord> {
        self.store.get(phone).await
    }

    /// Every known contact, keyed by phone
    pub async fn snapshot(&self) -> HashMap<String, ContactRecord> {
        self.store.all().await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ContactDirectory {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_then_get() {
        let directory = ContactDirectory::in_memory();
        directory.upsert("5511999", "Ana").await;

        let record = directory.get("5511999").await.unwrap();
        assert_eq!(record.phone, "5511999");
        assert_eq!(record.name, "Ana");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_name() {
        let directory = ContactDirectory::in_memory();
        directory.upsert("5511999", "Ana").await;
        directory.upsert("5511999", "Ana Paula").await;

        let record = directory.get("5511999").await.unwrap();
        assert_eq!(record.name, "Ana Paula");
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_phone_is_not_normalized() {
        let directory = ContactDirectory::in_memory();
        directory.upsert("5511999", "Ana").await;

        assert!(directory.get("+5511999").await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_serializes_as_mapping() {
        let directory = ContactDirectory::in_memory();
        assert!(directory.is_empty().await);
        directory.upsert("5511999", "Ana").await;

        let json = serde_json::to_value(directory.snapshot().await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"5511999": {"name": "Ana", "phone": "5511999"}})
        );
    }
}
