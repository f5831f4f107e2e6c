//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Stripe capabilities used by reconciliation and checkout
//! - `MembershipStore` - Durable per-user membership records

mod membership_store;
mod payment_provider;

pub use membership_store::{MembershipStore, StoreError};
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, Customer, PaymentError, PaymentErrorCode,
    PaymentProvider, Subscription,
};
