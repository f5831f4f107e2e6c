//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes, handlers and middleware
//! - `storage` - Membership store implementations (JSON file, in-memory)
//! - `stripe` - Stripe REST client and a mock provider

pub mod http;
pub mod storage;
pub mod stripe;

pub use storage::{InMemoryMembershipStore, JsonFileMembershipStore};
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
