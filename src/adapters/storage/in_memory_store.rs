//! In-Memory Membership Store Adapter
//!
//! Keeps records in a map only. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::membership::MembershipRecord;
use crate::ports::{MembershipStore, StoreError};

/// In-memory membership store
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipStore {
    records: Arc<RwLock<HashMap<UserId, MembershipRecord>>>,
}

impl InMemoryMembershipStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no record has been written
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Clear all records (useful for tests)
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<MembershipRecord>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, user_id: &UserId, record: MembershipRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(user_id.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_and_get() {
        let store = InMemoryMembershipStore::new();
        let user_id = UserId::new("u1").unwrap();
        let record = MembershipRecord::from_subscription("active", "sub_1", "cus_1", 10, 1);

        store.upsert(&user_id, record.clone()).await.unwrap();

        assert_eq!(store.get(&user_id).await.unwrap(), Some(record));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryMembershipStore::new();
        let clone = store.clone();
        let user_id = UserId::new("u1").unwrap();

        clone
            .upsert(&user_id, MembershipRecord::canceled("sub_1", "cus_1", 1))
            .await
            .unwrap();

        assert!(!store.is_empty().await);
        store.clear().await;
        assert!(clone.is_empty().await);
    }
}
