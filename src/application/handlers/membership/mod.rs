//! Membership handlers.
//!
//! ## Commands
//! - Reconciling verified Stripe webhook events into membership records
//! - Creating subscription checkout sessions
//!
//! ## Queries
//! - Get a user's current entitlement

mod create_checkout_session;
mod get_membership_status;
mod reconcile_webhook;

// Commands
pub use create_checkout_session::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult,
};
pub use reconcile_webhook::{ReconcileOutcome, ReconcileWebhookHandler, SkipReason};

// Queries
pub use get_membership_status::{
    GetMembershipStatusHandler, GetMembershipStatusQuery, MembershipStatusView,
};
