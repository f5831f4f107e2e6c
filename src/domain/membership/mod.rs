//! Membership domain module.
//!
//! Handles the membership record, entitlement evaluation and Stripe webhook
//! authentication.
//!
//! # Module Structure
//!
//! - `record` - MembershipRecord and the entitlement rule
//! - `status` - Stripe subscription status vocabulary
//! - `stripe_event` - Webhook envelope and payload objects
//! - `webhook_verifier` - Stripe-Signature verification

mod errors;
mod record;
mod status;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use errors::MembershipError;
pub use record::MembershipRecord;
pub use status::SubscriptionStatus;
pub use stripe_event::{
    user_id_from_metadata, CheckoutSessionObject, StripeEvent, StripeEventData, StripeEventType,
    SubscriptionItem, SubscriptionItems, SubscriptionObject, USER_ID_METADATA_KEY,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
