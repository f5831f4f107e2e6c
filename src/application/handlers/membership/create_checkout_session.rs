//! CreateCheckoutSessionHandler - Command handler starting a Stripe subscription checkout.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::membership::MembershipError;
use crate::ports::{CreateCheckoutRequest, PaymentProvider};

/// Price table and redirect URLs used to build checkout sessions.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSettings {
    /// Plan key to Stripe price ID.
    pub prices: HashMap<String, String>,
    /// Plan used when the caller does not name one.
    pub default_plan: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutSettings {
    /// Resolves an optional plan key to `(plan_key, price_id)`.
    pub fn resolve_price(&self, plan_key: Option<&str>) -> Result<(String, String), MembershipError> {
        let plan_key = plan_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(&self.default_plan)
            .to_string();

        match self.prices.get(&plan_key).filter(|price| !price.is_empty()) {
            Some(price_id) => Ok((plan_key, price_id.clone())),
            None => Err(MembershipError::missing_plan(plan_key)),
        }
    }
}

/// Command to start a checkout for a user.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub user_id: UserId,
    pub plan_key: Option<String>,
}

/// Result of a successful checkout creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub url: String,
}

/// Handler for creating subscription checkout sessions.
///
/// The canonical user id travels in the session and subscription metadata,
/// which is how the webhook reconciler later attributes the payment.
pub struct CreateCheckoutSessionHandler {
    provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutSessionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, settings: CheckoutSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, MembershipError> {
        let (plan_key, price_id) = self.settings.resolve_price(cmd.plan_key.as_deref())?;

        let request = CreateCheckoutRequest {
            user_id: cmd.user_id.clone(),
            price_id,
            success_url: self.settings.success_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        };

        let session = self
            .provider
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %cmd.user_id, plan_key = %plan_key, "Checkout session creation failed: {}", e);
                MembershipError::from(e)
            })?;

        tracing::info!(user_id = %cmd.user_id, plan_key = %plan_key, session_id = %session.id, "Checkout session created");

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            url: session.url,
        })
    }
}
