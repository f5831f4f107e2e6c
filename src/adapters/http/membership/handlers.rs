//! HTTP handlers for membership endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::membership::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    GetMembershipStatusHandler, GetMembershipStatusQuery, MembershipStatusView,
    ReconcileWebhookHandler,
};
use crate::domain::foundation::UserId;
use crate::domain::membership::{MembershipError, StripeWebhookVerifier, WebhookError};
use crate::ports::{MembershipStore, PaymentProvider};

use super::super::middleware::InternalAuthState;
use super::dto::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, ErrorResponse, MembershipStatusParams,
    WebhookAck,
};

/// Body of the health route.
pub const HEALTH_MESSAGE: &str = "Billing service running";

/// Header carrying Stripe's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct MembershipAppState {
    pub membership_store: Arc<dyn MembershipStore>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub checkout_settings: CheckoutSettings,
    pub internal_auth: InternalAuthState,
}

impl MembershipAppState {
    /// Create handlers on demand from the shared state.
    pub fn webhook_handler(&self) -> ReconcileWebhookHandler {
        ReconcileWebhookHandler::new(
            self.payment_provider.clone(),
            self.membership_store.clone(),
        )
    }

    pub fn status_handler(&self) -> GetMembershipStatusHandler {
        GetMembershipStatusHandler::new(self.membership_store.clone())
    }

    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.payment_provider.clone(),
            self.checkout_settings.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness probe
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// POST /stripe/webhook - Handle Stripe webhook events
///
/// Any verification failure answers `400 Invalid` without touching the
/// store. Once verified, the event is reconciled exactly once.
pub async fn handle_stripe_webhook(
    State(state): State<MembershipAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return webhook_rejected(WebhookError::MissingSignature);
    };

    let event = match state.webhook_verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(e) => return webhook_rejected(e),
    };

    match state.webhook_handler().handle(&event).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { ok: true })).into_response(),
        Err(e) => {
            tracing::error!(event_id = %event.id, event_type = %event.event_type, "Webhook processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

fn webhook_rejected(err: WebhookError) -> Response {
    tracing::warn!("Rejected webhook: {}", err);
    (err.status_code(), "Invalid").into_response()
}

/// GET /membership/status?user_id=... - Current entitlement for a user
pub async fn get_membership_status(
    State(state): State<MembershipAppState>,
    Query(params): Query<MembershipStatusParams>,
) -> Result<Json<MembershipStatusView>, MembershipApiError> {
    let user_id = UserId::parse_optional(params.user_id.as_deref())
        .ok_or(MembershipError::missing_field("user_id"))?;

    let query = GetMembershipStatusQuery { user_id };
    let view = state.status_handler().handle(query).await?;

    Ok(Json(view))
}

/// POST /create-checkout-session - Start a subscription checkout
///
/// An unreadable body is treated like an empty one, which fails on the
/// missing user id.
pub async fn create_checkout_session(
    State(state): State<MembershipAppState>,
    payload: Result<Json<CreateCheckoutSessionRequest>, JsonRejection>,
) -> Result<Json<CheckoutSessionResponse>, MembershipApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Unreadable checkout body: {}", rejection);
            CreateCheckoutSessionRequest::default()
        }
    };

    let user_id = UserId::parse_optional(request.user_id.as_deref())
        .ok_or(MembershipError::missing_field("user_id"))?;

    let cmd = CreateCheckoutSessionCommand {
        user_id,
        plan_key: request.plan_key,
    };
    let result = state.checkout_handler().handle(cmd).await?;

    Ok(Json(CheckoutSessionResponse { url: result.url }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct MembershipApiError(MembershipError);

impl From<MembershipError> for MembershipApiError {
    fn from(err: MembershipError) -> Self {
        Self(err)
    }
}

impl MembershipApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            MembershipError::Unauthorized => StatusCode::UNAUTHORIZED,
            MembershipError::MissingRequiredField(_) => StatusCode::BAD_REQUEST,
            MembershipError::MissingPlanConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MembershipError::Provider { .. } => StatusCode::BAD_GATEWAY,
            MembershipError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MembershipApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self.0 {
            MembershipError::Unauthorized => "unauthorized".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, "Request failed: {}", message);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: MembershipError) -> StatusCode {
        MembershipApiError::from(err).status_code()
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(status_of(MembershipError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(MembershipError::missing_field("user_id")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(MembershipError::missing_plan("annual")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(MembershipError::provider("No such price", false)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(MembershipError::storage("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn unauthorized_body_is_lowercase() {
        let response = MembershipApiError::from(MembershipError::Unauthorized).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"error":"unauthorized"}"#);
    }

    #[tokio::test]
    async fn missing_field_body() {
        let response =
            MembershipApiError::from(MembershipError::missing_field("user_id")).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"error":"missing user_id"}"#);
    }
}
