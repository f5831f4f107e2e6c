//! Stripe REST response types.
//!
//! Only the fields this service reads are captured; everything else in
//! Stripe's payloads is ignored. Fields Stripe may omit on older or newer
//! API versions are defaulted rather than required.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::{CheckoutSession, Customer, Subscription};

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object (response to `POST /v1/checkout/sessions`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted checkout page; absent once the session is complete or expired.
    #[serde(default)]
    pub url: Option<String>,

    /// Payment mode (payment, setup, subscription).
    #[serde(default)]
    pub mode: Option<String>,

    /// Custom metadata attached to the session.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeCheckoutSession {
    /// Hosted checkout URL, falling back to the well-known pay path.
    pub fn into_checkout_session(self) -> CheckoutSession {
        let url = self
            .url
            .unwrap_or_else(|| format!("https://checkout.stripe.com/c/pay/{}", self.id));
        CheckoutSession { id: self.id, url }
    }
}

/// Stripe Customer object.
///
/// Retrieving a deleted customer returns a stub with `deleted: true`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Whether the customer has been deleted.
    #[serde(default)]
    pub deleted: bool,
}

impl StripeCustomer {
    /// Live customer, or `None` for a deleted stub.
    pub fn into_customer(self) -> Option<Customer> {
        if self.deleted {
            return None;
        }
        Some(Customer {
            id: self.id,
            metadata: self.metadata,
        })
    }
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Customer ID owning this subscription.
    #[serde(default)]
    pub customer: String,

    /// Subscription status.
    #[serde(default)]
    pub status: String,

    /// Current period end; moved onto items in newer API versions.
    #[serde(default)]
    pub current_period_end: Option<i64>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Subscription items.
    #[serde(default)]
    pub items: StripeSubscriptionItems,
}

impl StripeSubscription {
    /// Converts to the port type, resolving the period end from the first
    /// item when the top-level field is absent.
    pub fn into_subscription(self) -> Subscription {
        let current_period_end = self
            .current_period_end
            .or_else(|| self.items.data.first().and_then(|i| i.current_period_end))
            .unwrap_or(0);

        Subscription {
            id: self.id,
            customer_id: self.customer,
            status: self.status,
            current_period_end,
            metadata: self.metadata,
        }
    }
}

/// Subscription items container.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeSubscriptionItems {
    /// List of subscription items.
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

/// Single subscription item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    /// Item ID.
    pub id: String,

    /// Item period end (newer API versions).
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}
