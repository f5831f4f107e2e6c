//! HTTP adapter for membership endpoints.
//!
//! Exposes the billing service via REST API:
//! - `GET /` - Liveness probe
//! - `POST /stripe/webhook` - Handle Stripe webhooks
//! - `GET /membership/status` - Current entitlement for a user (internal key)
//! - `POST /create-checkout-session` - Start a subscription checkout (internal key)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{MembershipApiError, MembershipAppState, HEALTH_MESSAGE};
pub use routes::{internal_routes, membership_router, public_routes};
