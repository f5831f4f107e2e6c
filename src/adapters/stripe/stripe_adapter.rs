//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API using
//! form-encoded requests authenticated with the secret key.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_timeout(Duration::from_secs(30));
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::domain::membership::USER_ID_METADATA_KEY;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, Customer, PaymentError, PaymentErrorCode,
    PaymentProvider, Subscription,
};

use super::api_types::{
    StripeCheckoutSession, StripeCustomer, StripeErrorResponse, StripeSubscription,
};

/// Default Stripe API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout for outbound calls.
    timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the outbound request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Stripe payment provider adapter.
///
/// Implements `PaymentProvider` for Stripe API integration.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, PaymentError> {
        self.http_client
            .get(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<reqwest::Response, PaymentError> {
        self.http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))
    }
}

/// Maps a non-success Stripe response to a `PaymentError`.
async fn error_from_response(operation: &str, response: reqwest::Response) -> PaymentError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StripeErrorResponse>(&error_text)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or(error_text);

    tracing::error!(operation, status = %status, error = %message, "Stripe request failed");

    let code = match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            PaymentErrorCode::AuthenticationError
        }
        reqwest::StatusCode::NOT_FOUND => PaymentErrorCode::NotFound,
        reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        _ => PaymentErrorCode::ProviderError,
    };

    PaymentError::new(code, format!("Stripe API error: {}", message))
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PaymentError> {
    response.json().await.map_err(|e| {
        PaymentError::new(
            PaymentErrorCode::ProviderError,
            format!("Failed to parse Stripe response: {}", e),
        )
    })
}

/// Form parameters for `POST /v1/customers/{id}` merging metadata keys.
fn metadata_params(metadata: HashMap<String, String>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = metadata
        .into_iter()
        .map(|(key, value)| (format!("metadata[{}]", key), value))
        .collect();
    params.sort();
    params
}

/// Form parameters for `POST /v1/checkout/sessions`.
///
/// The user id goes into the session metadata, the subscription metadata
/// and the client reference so every later event can be attributed.
fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
    let user_id = request.user_id.as_str().to_string();
    vec![
        ("mode".to_string(), "subscription".to_string()),
        ("line_items[0][price]".to_string(), request.price_id.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("client_reference_id".to_string(), user_id.clone()),
        (format!("metadata[{}]", USER_ID_METADATA_KEY), user_id.clone()),
        (
            format!("subscription_data[metadata][{}]", USER_ID_METADATA_KEY),
            user_id,
        ),
    ]
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        let response = self
            .get(&format!("/v1/subscriptions/{}", subscription_id))
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("retrieve_subscription", response).await);
        }

        let stripe_sub: StripeSubscription = parse_json(response).await?;
        Ok(stripe_sub.into_subscription())
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError> {
        let response = self.get(&format!("/v1/customers/{}", customer_id)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(error_from_response("retrieve_customer", response).await);
        }

        let stripe_customer: StripeCustomer = parse_json(response).await?;
        Ok(stripe_customer.into_customer())
    }

    async fn update_customer_metadata(
        &self,
        customer_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), PaymentError> {
        let params = metadata_params(metadata);
        let response = self
            .post_form(&format!("/v1/customers/{}", customer_id), &params)
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response("update_customer_metadata", response).await);
        }

        Ok(())
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = checkout_params(&request);
        let response = self.post_form("/v1/checkout/sessions", &params).await?;

        if !response.status().is_success() {
            return Err(error_from_response("create_checkout_session", response).await);
        }

        let stripe_session: StripeCheckoutSession = parse_json(response).await?;
        Ok(stripe_session.into_checkout_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn test_config() -> StripeConfig {
        StripeConfig::new(SecretString::new("sk_test_key".to_string()))
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = test_config();
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_with_base_url_strips_trailing_slash() {
        let config = test_config().with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn config_debug_redacts_api_key() {
        let debug = format!("{:?}", test_config());
        assert!(!debug.contains("sk_test_key"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn adapter_builds_urls_from_base() {
        let adapter =
            StripePaymentAdapter::new(test_config().with_base_url("http://localhost:12111"))
                .unwrap();
        assert_eq!(
            adapter.url("/v1/subscriptions/sub_1"),
            "http://localhost:12111/v1/subscriptions/sub_1"
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Encoding Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn checkout_params_carry_user_id_everywhere() {
        let request = CreateCheckoutRequest {
            user_id: UserId::new("User-42").unwrap(),
            price_id: "price_monthly".to_string(),
            success_url: "https://app.example.com/ok".to_string(),
            cancel_url: "https://app.example.com/cancel".to_string(),
        };

        let params = checkout_params(&request);

        assert_eq!(param(&params, "mode"), Some("subscription"));
        assert_eq!(param(&params, "line_items[0][price]"), Some("price_monthly"));
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("1"));
        assert_eq!(param(&params, "client_reference_id"), Some("user-42"));
        assert_eq!(param(&params, "metadata[user_id]"), Some("user-42"));
        assert_eq!(
            param(&params, "subscription_data[metadata][user_id]"),
            Some("user-42")
        );
        assert_eq!(param(&params, "success_url"), Some("https://app.example.com/ok"));
        assert_eq!(param(&params, "cancel_url"), Some("https://app.example.com/cancel"));
    }

    #[test]
    fn metadata_params_are_bracketed_and_sorted() {
        let params = metadata_params(HashMap::from([
            ("user_id".to_string(), "u1".to_string()),
            ("source".to_string(), "checkout".to_string()),
        ]));

        assert_eq!(
            params,
            vec![
                ("metadata[source]".to_string(), "checkout".to_string()),
                ("metadata[user_id]".to_string(), "u1".to_string()),
            ]
        );
    }
}
