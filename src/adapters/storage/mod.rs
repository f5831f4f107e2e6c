//! Storage Adapters
//!
//! Implementations of the MembershipStore port.
//!
//! ## Available Adapters
//!
//! - **JsonFileMembershipStore** - All records in one JSON file on disk
//! - **InMemoryMembershipStore** - Records in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryMembershipStore, JsonFileMembershipStore};
//!
//! // Production: file-based storage
//! let store = JsonFileMembershipStore::open("./memberships.json").await?;
//!
//! // Testing: in-memory storage
//! let store = InMemoryMembershipStore::new();
//! ```

mod in_memory_store;
mod json_file_store;

pub use in_memory_store::InMemoryMembershipStore;
pub use json_file_store::JsonFileMembershipStore;
