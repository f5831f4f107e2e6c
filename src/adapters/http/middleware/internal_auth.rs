//! Internal credential middleware for axum.
//!
//! Client applications authenticate with a shared key:
//!
//! ```text
//! Authorization: Bearer <internal_api_key>
//! ```
//!
//! The middleware rejects before any handler runs, so an unauthorized
//! request never reaches the membership store or Stripe.
//!
//! # Example
//!
//! ```ignore
//! let auth = InternalAuthState::new(config.auth.internal_api_key.clone());
//!
//! let app = Router::new()
//!     .route("/membership/status", get(get_membership_status))
//!     .route_layer(middleware::from_fn_with_state(auth, require_internal_key));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::domain::membership::MembershipError;

use super::super::membership::MembershipApiError;

/// Middleware state holding the expected internal key.
#[derive(Clone)]
pub struct InternalAuthState {
    api_key: Arc<SecretString>,
}

impl InternalAuthState {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }

    /// Constant-time check of a presented key. An empty configured key
    /// matches nothing.
    pub fn accepts(&self, presented: &str) -> bool {
        let expected = self.api_key.expose_secret().as_bytes();
        if expected.is_empty() {
            return false;
        }
        bool::from(expected.ct_eq(presented.as_bytes()))
    }
}

/// Extracts the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Rejects requests without the internal bearer credential with
/// `401 {"error": "unauthorized"}`.
pub async fn require_internal_key(
    State(auth): State<InternalAuthState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = bearer_token(request.headers())
        .map(|token| auth.accepts(token))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "Rejected request without valid internal credential");
        return MembershipApiError::from(MembershipError::Unauthorized).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn state(key: &str) -> InternalAuthState {
        InternalAuthState::new(SecretString::new(key.to_string()))
    }

    fn app(key: &str) -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(state(key), require_internal_key))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn accepts_only_exact_key() {
        let auth = state("secret-key");
        assert!(auth.accepts("secret-key"));
        assert!(!auth.accepts("secret-key2"));
        assert!(!auth.accepts("secret"));
        assert!(!auth.accepts(""));
    }

    #[test]
    fn empty_configured_key_accepts_nothing() {
        assert!(!state("").accepts(""));
    }

    #[tokio::test]
    async fn valid_bearer_passes_through() {
        let (status, body) = call(app("secret-key"), Some("Bearer secret-key")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (status, body) = call(app("secret-key"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error":"unauthorized"}"#);
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized() {
        let (status, _) = call(app("secret-key"), Some("Bearer other")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let (status, _) = call(app("secret-key"), Some("Basic secret-key")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
