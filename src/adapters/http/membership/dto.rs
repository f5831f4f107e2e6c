//! HTTP DTOs (Data Transfer Objects) for membership endpoints.
//!
//! These types define the JSON request/response structure for the membership API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string of `GET /membership/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipStatusParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of `POST /create-checkout-session`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    /// Calling application's user identifier.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Plan to subscribe to; the configured default when absent.
    #[serde(default)]
    pub plan_key: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response carrying the hosted checkout URL.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// Acknowledgement returned to Stripe for an accepted webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Error body shared by every JSON error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checkout_request_fields_are_optional() {
        let req: CreateCheckoutSessionRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.user_id.is_none());
        assert!(req.plan_key.is_none());

        let req: CreateCheckoutSessionRequest =
            serde_json::from_value(json!({"user_id": "u1", "plan_key": "annual"})).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("u1"));
        assert_eq!(req.plan_key.as_deref(), Some("annual"));
    }

    #[test]
    fn error_response_serializes() {
        let body = serde_json::to_value(ErrorResponse::new("missing user_id")).unwrap();
        assert_eq!(body, json!({"error": "missing user_id"}));
    }

    #[test]
    fn webhook_ack_serializes() {
        let body = serde_json::to_value(WebhookAck { ok: true }).unwrap();
        assert_eq!(body, json!({"ok": true}));
    }
}
