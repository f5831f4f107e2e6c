//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured subscriptions and customers
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, Customer, PaymentError, PaymentProvider, Subscription,
};

/// Mock payment provider for testing.
///
/// Clones share state, so a test can keep one handle for assertions and
/// hand another to the code under test.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Configure responses
/// mock.add_subscription(Subscription { id: "sub_123".into(), ... });
///
/// // Inject errors
/// mock.set_method_error("retrieve_subscription", PaymentError::network("reset"));
///
/// // Use in tests
/// let handler = ReconcileWebhookHandler::new(Arc::new(mock.clone()), store);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Pre-configured customers by ID.
    customers: HashMap<String, Customer>,

    /// Pre-configured subscriptions by ID.
    subscriptions: HashMap<String, Subscription>,

    /// Next checkout session to return.
    next_checkout: Option<CheckoutSession>,

    /// Checkout requests received, in order.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Sessions created so far (drives generated IDs).
    checkout_count: usize,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a customer to the "database".
    pub fn add_customer(&self, customer: Customer) {
        let id = customer.id.clone();
        self.state().customers.insert(id, customer);
    }

    /// Add a subscription to the "database".
    pub fn add_subscription(&self, subscription: Subscription) {
        let id = subscription.id.clone();
        self.state().subscriptions.insert(id, subscription);
    }

    /// Set the checkout session to return.
    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.state().next_checkout = Some(session);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection
    // ════════════════════════════════════════════════════════════════════════════

    /// Current view of a stored customer.
    pub fn customer(&self, customer_id: &str) -> Option<Customer> {
        self.state().customers.get(customer_id).cloned()
    }

    /// Checkout requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.state().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        // Method-specific errors persist until cleared
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Global error is consumed
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        self.record_call("retrieve_subscription", vec![subscription_id.to_string()]);
        self.check_error("retrieve_subscription")?;

        self.state()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Subscription"))
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Option<Customer>, PaymentError> {
        self.record_call("retrieve_customer", vec![customer_id.to_string()]);
        self.check_error("retrieve_customer")?;

        Ok(self.state().customers.get(customer_id).cloned())
    }

    async fn update_customer_metadata(
        &self,
        customer_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), PaymentError> {
        let mut args = vec![customer_id.to_string()];
        args.extend(metadata.iter().map(|(k, v)| format!("{}={}", k, v)));
        self.record_call("update_customer_metadata", args);
        self.check_error("update_customer_metadata")?;

        let mut state = self.state();
        let customer = state
            .customers
            .entry(customer_id.to_string())
            .or_insert_with(|| Customer {
                id: customer_id.to_string(),
                metadata: HashMap::new(),
            });
        customer.metadata.extend(metadata);

        Ok(())
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![request.user_id.to_string(), request.price_id.clone()],
        );
        self.check_error("create_checkout_session")?;

        let mut state = self.state();
        state.checkout_count += 1;
        let count = state.checkout_count;
        state.checkout_requests.push(request);

        let session = state.next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", count);
            CheckoutSession {
                url: format!("https://checkout.stripe.com/c/pay/{}", id),
                id,
            }
        });

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn subscription(id: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            customer_id: "cus_1".to_string(),
            status: "active".to_string(),
            current_period_end: 1_999_999_999,
            metadata: HashMap::new(),
        }
    }

    fn checkout_request() -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            user_id: UserId::new("u1").unwrap(),
            price_id: "price_1".to_string(),
            success_url: "https://app.example.com/ok".to_string(),
            cancel_url: "https://app.example.com/cancel".to_string(),
        }
    }

    #[tokio::test]
    async fn retrieve_subscription_returns_configured() {
        let mock = MockPaymentProvider::new();
        mock.add_subscription(subscription("sub_1"));

        let sub = mock.retrieve_subscription("sub_1").await.unwrap();

        assert_eq!(sub.status, "active");
        assert!(mock.was_called("retrieve_subscription"));
    }

    #[tokio::test]
    async fn retrieve_subscription_unknown_is_not_found() {
        let mock = MockPaymentProvider::new();

        let err = mock.retrieve_subscription("sub_x").await.unwrap_err();

        assert_eq!(err, PaymentError::not_found("Subscription"));
    }

    #[tokio::test]
    async fn retrieve_customer_unknown_is_none() {
        let mock = MockPaymentProvider::new();

        assert!(mock.retrieve_customer("cus_x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_customer_metadata_merges() {
        let mock = MockPaymentProvider::new();
        mock.add_customer(Customer {
            id: "cus_1".to_string(),
            metadata: HashMap::from([("plan".to_string(), "monthly".to_string())]),
        });

        mock.update_customer_metadata(
            "cus_1",
            HashMap::from([("user_id".to_string(), "u1".to_string())]),
        )
        .await
        .unwrap();

        let customer = mock.customer("cus_1").unwrap();
        assert_eq!(customer.metadata.len(), 2);
        assert_eq!(mock.calls()[0].args, vec!["cus_1", "user_id=u1"]);
    }

    #[tokio::test]
    async fn checkout_sessions_get_distinct_ids() {
        let mock = MockPaymentProvider::new();

        let first = mock.create_checkout_session(checkout_request()).await.unwrap();
        let second = mock.create_checkout_session(checkout_request()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.url.ends_with(&second.id));
        assert_eq!(mock.checkout_requests().len(), 2);
    }

    #[tokio::test]
    async fn global_error_is_consumed() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::network("timeout"));

        assert!(mock.retrieve_customer("cus_1").await.is_err());
        assert!(mock.retrieve_customer("cus_1").await.is_ok());
    }

    #[tokio::test]
    async fn method_error_persists_until_cleared() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error("retrieve_customer", PaymentError::authentication("bad key"));

        assert!(mock.retrieve_customer("cus_1").await.is_err());
        assert!(mock.retrieve_customer("cus_1").await.is_err());

        mock.clear_errors();
        assert!(mock.retrieve_customer("cus_1").await.is_ok());
        assert_eq!(mock.call_count("retrieve_customer"), 3);

        mock.clear_calls();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockPaymentProvider::new();
        let clone = mock.clone();

        clone.add_subscription(subscription("sub_1"));

        assert!(mock.retrieve_subscription("sub_1").await.is_ok());
    }
}
