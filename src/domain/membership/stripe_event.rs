//! Stripe webhook event types.
//!
//! Defines the structures for parsing Stripe webhook payloads.
//! Only fields relevant to our processing are captured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// Metadata key carrying the calling application's user identifier.
pub const USER_ID_METADATA_KEY: &str = "user_id";

/// Stripe webhook event (simplified).
///
/// Contains the essential fields needed for webhook processing.
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_str(&self.event_type)
    }
}

/// Stripe event types the reconciler acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,
    /// Customer subscription was updated.
    CustomerSubscriptionUpdated,
    /// Customer subscription was deleted.
    CustomerSubscriptionDeleted,
    /// Anything else; acknowledged and ignored.
    Unknown,
}

impl StripeEventType {
    /// Parse event type from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            _ => Self::Unknown,
        }
    }

    /// Convert to the Stripe event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::Unknown => "unknown",
        }
    }
}

/// Checkout session as delivered in `checkout.session.completed`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSessionObject {
    /// Session identifier (cs_...).
    pub id: String,

    /// Customer created or attached by the checkout.
    #[serde(default)]
    pub customer: Option<String>,

    /// Subscription created by the checkout (subscription mode only).
    #[serde(default)]
    pub subscription: Option<String>,

    /// Metadata set when the session was created.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionObject {
    /// User identifier carried in the session metadata.
    pub fn user_id(&self) -> Option<UserId> {
        user_id_from_metadata(&self.metadata)
    }
}

/// Subscription as delivered in `customer.subscription.*` events.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionObject {
    /// Subscription identifier (sub_...).
    pub id: String,

    /// Owning customer.
    #[serde(default)]
    pub customer: String,

    /// Stripe's status string.
    #[serde(default)]
    pub status: String,

    /// Period end on API versions that still report it at the top level.
    #[serde(default)]
    pub current_period_end: Option<i64>,

    /// Subscription metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Subscription items; newer API versions carry the period end here.
    #[serde(default)]
    pub items: SubscriptionItems,
}

/// List wrapper around subscription items.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

/// Single subscription item (only the period end matters to us).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub current_period_end: Option<i64>,
}

impl SubscriptionObject {
    /// User identifier carried in the subscription metadata.
    pub fn user_id(&self) -> Option<UserId> {
        user_id_from_metadata(&self.metadata)
    }

    /// Paid-through timestamp, falling back to the first item. 0 when absent.
    pub fn period_end(&self) -> i64 {
        self.current_period_end
            .or_else(|| self.items.data.first().and_then(|i| i.current_period_end))
            .unwrap_or(0)
    }
}

/// Reads and canonicalizes `metadata.user_id`.
pub fn user_id_from_metadata(metadata: &HashMap<String, String>) -> Option<UserId> {
    UserId::parse_optional(metadata.get(USER_ID_METADATA_KEY).map(String::as_str))
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ══════════════════════════════════════════════════════════════
    // StripeEvent Deserialization Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {
                "object": {}
            },
            "livemode": false,
            "api_version": "2023-10-16"
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, 1704067200);
        assert!(!event.is_live());
        assert_eq!(event.api_version.as_deref(), Some("2023-10-16"));
    }

    #[test]
    fn deserialize_event_with_null_api_version() {
        let json = r#"{"id":"evt_1","type":"ping","data":{"object":{}},"api_version":null}"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert!(event.api_version.is_none());
        assert_eq!(event.parsed_type(), StripeEventType::Unknown);
    }

    #[test]
    fn event_type_round_trips_known_types() {
        for t in [
            StripeEventType::CheckoutSessionCompleted,
            StripeEventType::CustomerSubscriptionUpdated,
            StripeEventType::CustomerSubscriptionDeleted,
        ] {
            assert_eq!(StripeEventType::from_str(t.as_str()), t);
        }
        assert_eq!(
            StripeEventType::from_str("invoice.paid"),
            StripeEventType::Unknown
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Object Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkout_session_reads_user_id_from_metadata() {
        let event = StripeEventBuilder::new()
            .object(json!({
                "id": "cs_1",
                "object": "checkout.session",
                "customer": "cus_1",
                "subscription": "sub_1",
                "metadata": {"user_id": " U1 "}
            }))
            .build();

        let session: CheckoutSessionObject = event.deserialize_object().unwrap();

        assert_eq!(session.user_id().unwrap().as_str(), "u1");
        assert_eq!(session.subscription.as_deref(), Some("sub_1"));
        assert_eq!(session.customer.as_deref(), Some("cus_1"));
    }

    #[test]
    fn checkout_session_without_metadata_has_no_user() {
        let session: CheckoutSessionObject =
            serde_json::from_value(json!({"id": "cs_1", "customer": null})).unwrap();

        assert!(session.user_id().is_none());
        assert!(session.customer.is_none());
    }

    #[test]
    fn subscription_period_end_prefers_top_level() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "current_period_end": 1999999999,
            "items": {"data": [{"id": "si_1", "current_period_end": 1888888888}]}
        }))
        .unwrap();

        assert_eq!(sub.period_end(), 1999999999);
    }

    #[test]
    fn subscription_period_end_falls_back_to_first_item() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "items": {"object": "list", "data": [{"id": "si_1", "current_period_end": 1888888888}]}
        }))
        .unwrap();

        assert_eq!(sub.period_end(), 1888888888);
    }

    #[test]
    fn subscription_period_end_defaults_to_zero() {
        let sub: SubscriptionObject =
            serde_json::from_value(json!({"id": "sub_1", "status": "canceled"})).unwrap();

        assert_eq!(sub.period_end(), 0);
        assert!(sub.user_id().is_none());
    }

    #[test]
    fn blank_metadata_user_id_is_ignored() {
        let mut metadata = HashMap::new();
        metadata.insert(USER_ID_METADATA_KEY.to_string(), "   ".to_string());

        assert!(user_id_from_metadata(&metadata).is_none());
    }
}
