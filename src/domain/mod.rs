//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (user identifier, timestamps, errors)
//! - `membership` - Membership record, entitlement rule, Stripe webhook types

pub mod foundation;
pub mod membership;
