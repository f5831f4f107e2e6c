//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration:
//! - Subscription and customer retrieval
//! - Customer metadata updates
//! - Subscription checkout sessions
//!
//! Webhook signature verification lives in the domain
//! (`StripeWebhookVerifier`); this module only talks to the REST API.

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{StripeCheckoutSession, StripeCustomer, StripeSubscription};
pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter, DEFAULT_API_BASE_URL};
