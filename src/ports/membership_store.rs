//! Membership store port.
//!
//! Durable mapping from canonical user identifier to membership record.
//! Implementations must serialize writes so concurrent upserts never lose
//! an update.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::membership::{MembershipError, MembershipRecord};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Failed to serialize store: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize store: {0}")]
    DeserializationFailed(String),
}

impl From<StoreError> for MembershipError {
    fn from(err: StoreError) -> Self {
        MembershipError::storage(err.to_string())
    }
}

/// Port for reading and writing membership records.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Look up the record for a user.
    async fn get(&self, user_id: &UserId) -> Result<Option<MembershipRecord>, StoreError>;

    /// Insert or fully replace the record for a user.
    async fn upsert(&self, user_id: &UserId, record: MembershipRecord) -> Result<(), StoreError>;
}
