//! ReconcileWebhookHandler - Command handler mapping verified Stripe events to record upserts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{unix_now, UserId};
use crate::domain::membership::{
    user_id_from_metadata, CheckoutSessionObject, MembershipError, MembershipRecord, StripeEvent,
    StripeEventType, SubscriptionObject, USER_ID_METADATA_KEY,
};
use crate::ports::{MembershipStore, PaymentProvider};

/// Why an event was acknowledged without writing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `metadata.user_id` on the object or its customer.
    MissingUserId,
    /// Checkout completed without creating a subscription.
    MissingSubscription,
    /// The subscription's customer no longer exists.
    CustomerNotFound,
    /// The event's data object did not have the expected shape.
    MalformedObject,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::MissingUserId => "missing user_id",
            SkipReason::MissingSubscription => "missing subscription",
            SkipReason::CustomerNotFound => "customer not found",
            SkipReason::MalformedObject => "malformed object",
        };
        write!(f, "{}", s)
    }
}

/// Result of reconciling one webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A record was written for the user.
    Upserted {
        user_id: UserId,
        record: MembershipRecord,
    },
    /// A handled event type that could not be attributed to a user.
    Skipped(SkipReason),
    /// An event type this service does not act on.
    Ignored(String),
}

/// Handler for verified Stripe webhook events.
///
/// Every reconciled event fully replaces the user's record. Provider and
/// store failures propagate so the caller can answer 500 and Stripe retries.
pub struct ReconcileWebhookHandler {
    provider: Arc<dyn PaymentProvider>,
    store: Arc<dyn MembershipStore>,
}

impl ReconcileWebhookHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, store: Arc<dyn MembershipStore>) -> Self {
        Self { provider, store }
    }

    pub async fn handle(&self, event: &StripeEvent) -> Result<ReconcileOutcome, MembershipError> {
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                self.handle_checkout_completed(event).await
            }
            StripeEventType::CustomerSubscriptionUpdated => {
                self.handle_subscription_changed(event, false).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.handle_subscription_changed(event, true).await
            }
            StripeEventType::Unknown => {
                tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
                Ok(ReconcileOutcome::Ignored(event.event_type.clone()))
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<ReconcileOutcome, MembershipError> {
        let session: CheckoutSessionObject = match event.deserialize_object() {
            Ok(session) => session,
            Err(e) => return Ok(skip(event, SkipReason::MalformedObject, Some(e.to_string()))),
        };

        let Some(user_id) = session.user_id() else {
            return Ok(skip(event, SkipReason::MissingUserId, None));
        };

        let Some(subscription_id) = non_empty(session.subscription.as_deref()) else {
            return Ok(skip(event, SkipReason::MissingSubscription, None));
        };

        let subscription = self
            .provider
            .retrieve_subscription(subscription_id)
            .await
            .map_err(|e| {
                tracing::error!(subscription_id, "Failed to retrieve subscription: {}", e);
                MembershipError::from(e)
            })?;

        let customer_id = non_empty(session.customer.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| subscription.customer_id.clone());

        let record = MembershipRecord::from_subscription(
            subscription.status,
            subscription.id,
            customer_id.clone(),
            subscription.current_period_end,
            unix_now(),
        );
        let outcome = self.write(event, user_id.clone(), record).await?;

        if !customer_id.is_empty() {
            self.backfill_customer_metadata(&customer_id, &user_id).await;
        }

        Ok(outcome)
    }

    async fn handle_subscription_changed(
        &self,
        event: &StripeEvent,
        deleted: bool,
    ) -> Result<ReconcileOutcome, MembershipError> {
        let subscription: SubscriptionObject = match event.deserialize_object() {
            Ok(subscription) => subscription,
            Err(e) => return Ok(skip(event, SkipReason::MalformedObject, Some(e.to_string()))),
        };

        let user_id = match subscription.user_id() {
            Some(user_id) => user_id,
            None => match self.user_id_from_customer(&subscription.customer).await? {
                Ok(user_id) => user_id,
                Err(reason) => return Ok(skip(event, reason, None)),
            },
        };

        let now = unix_now();
        let record = if deleted {
            MembershipRecord::canceled(&subscription.id, &subscription.customer, now)
        } else {
            MembershipRecord::from_subscription(
                &subscription.status,
                &subscription.id,
                &subscription.customer,
                subscription.period_end(),
                now,
            )
        };

        self.write(event, user_id, record).await
    }

    /// Falls back to the customer's metadata when the subscription has none.
    async fn user_id_from_customer(
        &self,
        customer_id: &str,
    ) -> Result<Result<UserId, SkipReason>, MembershipError> {
        if customer_id.is_empty() {
            return Ok(Err(SkipReason::MissingUserId));
        }

        let customer = self
            .provider
            .retrieve_customer(customer_id)
            .await
            .map_err(|e| {
                tracing::error!(customer_id, "Failed to retrieve customer: {}", e);
                MembershipError::from(e)
            })?;

        Ok(match customer {
            Some(customer) => {
                user_id_from_metadata(&customer.metadata).ok_or(SkipReason::MissingUserId)
            }
            None => Err(SkipReason::CustomerNotFound),
        })
    }

    async fn write(
        &self,
        event: &StripeEvent,
        user_id: UserId,
        record: MembershipRecord,
    ) -> Result<ReconcileOutcome, MembershipError> {
        self.store
            .upsert(&user_id, record.clone())
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, "Failed to persist membership record: {}", e);
                MembershipError::from(e)
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            user_id = %user_id,
            status = %record.status,
            current_period_end = record.current_period_end,
            "Membership record upserted"
        );

        Ok(ReconcileOutcome::Upserted { user_id, record })
    }

    /// Copies the user id onto the Stripe customer so later subscription
    /// events without metadata can still be attributed. Failure is non-fatal.
    async fn backfill_customer_metadata(&self, customer_id: &str, user_id: &UserId) {
        let metadata = HashMap::from([(
            USER_ID_METADATA_KEY.to_string(),
            user_id.as_str().to_string(),
        )]);

        if let Err(e) = self
            .provider
            .update_customer_metadata(customer_id, metadata)
            .await
        {
            tracing::warn!(customer_id, user_id = %user_id, "Customer metadata backfill failed: {}", e);
        }
    }
}

fn skip(event: &StripeEvent, reason: SkipReason, detail: Option<String>) -> ReconcileOutcome {
    tracing::info!(
        event_id = %event.id,
        event_type = %event.event_type,
        reason = %reason,
        detail = detail.as_deref().unwrap_or(""),
        "Skipping webhook event"
    );
    ReconcileOutcome::Skipped(reason)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
