//! Axum router configuration for membership endpoints.
//!
//! This module defines the route structure for the billing service and wires
//! each route to its handler.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::super::middleware::require_internal_key;
use super::handlers::{
    create_checkout_session, get_membership_status, handle_stripe_webhook, health,
    MembershipAppState,
};

/// Routes reachable without the internal credential.
///
/// # Routes
/// - `GET /` - Liveness probe
/// - `POST /stripe/webhook` - Handle Stripe webhooks (signature verified)
pub fn public_routes() -> Router<MembershipAppState> {
    Router::new()
        .route("/", get(health))
        .route("/stripe/webhook", post(handle_stripe_webhook))
}

/// Routes for client applications, guarded by the internal credential.
///
/// # Routes
/// - `GET /membership/status` - Current entitlement for a user
/// - `POST /create-checkout-session` - Start a subscription checkout
pub fn internal_routes(state: &MembershipAppState) -> Router<MembershipAppState> {
    Router::new()
        .route("/membership/status", get(get_membership_status))
        .route("/create-checkout-session", post(create_checkout_session))
        .route_layer(middleware::from_fn_with_state(
            state.internal_auth.clone(),
            require_internal_key,
        ))
}

/// Create the complete service router.
///
/// # Example
///
/// ```ignore
/// let state = MembershipAppState { /* ... */ };
/// let app = membership_router(state);
/// axum::serve(listener, app).await?;
/// ```
pub fn membership_router(state: MembershipAppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(internal_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
