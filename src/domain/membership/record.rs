//! Membership record: the stored entitlement snapshot for one user.

use serde::{Deserialize, Serialize};

use super::status::SubscriptionStatus;

/// Entitlement snapshot persisted per user.
///
/// A record is always rebuilt from a single Stripe event and replaces the
/// previous one wholesale. Cancellation is a status value; records are never
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Stripe's raw subscription status string.
    pub status: String,

    /// Stripe subscription ID (sub_...).
    pub subscription_id: String,

    /// Stripe customer ID (cus_...).
    #[serde(default)]
    pub customer_id: String,

    /// End of the paid-through period, Unix seconds. 0 means no active period.
    #[serde(default)]
    pub current_period_end: i64,

    /// When this record was written, Unix seconds.
    #[serde(default)]
    pub updated_at: i64,
}

impl MembershipRecord {
    /// Builds a record from a live subscription snapshot.
    pub fn from_subscription(
        status: impl Into<String>,
        subscription_id: impl Into<String>,
        customer_id: impl Into<String>,
        current_period_end: i64,
        now: i64,
    ) -> Self {
        Self {
            status: status.into(),
            subscription_id: subscription_id.into(),
            customer_id: customer_id.into(),
            current_period_end,
            updated_at: now,
        }
    }

    /// Builds the record written when Stripe deletes a subscription.
    ///
    /// The period end is zeroed whatever the payload says, so a hard delete
    /// revokes access immediately.
    pub fn canceled(
        subscription_id: impl Into<String>,
        customer_id: impl Into<String>,
        now: i64,
    ) -> Self {
        Self::from_subscription(
            SubscriptionStatus::Canceled.as_str(),
            subscription_id,
            customer_id,
            0,
            now,
        )
    }

    /// Interpreted subscription status.
    pub fn subscription_status(&self) -> SubscriptionStatus {
        SubscriptionStatus::parse(&self.status)
    }

    /// Whether the user is entitled at `now` (Unix seconds).
    ///
    /// Active and trialing subscriptions are entitled. A canceled subscription
    /// stays entitled until its paid-through period ends.
    pub fn is_active(&self, now: i64) -> bool {
        match self.subscription_status() {
            status if status.grants_access() => true,
            SubscriptionStatus::Canceled => self.current_period_end > now,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_750_000_000;

    fn record(status: &str, period_end: i64) -> MembershipRecord {
        MembershipRecord::from_subscription(status, "sub_1", "cus_1", period_end, NOW)
    }

    #[test]
    fn active_and_trialing_are_entitled_even_with_past_period_end() {
        assert!(record("active", 0).is_active(NOW));
        assert!(record("trialing", NOW - 10).is_active(NOW));
    }

    #[test]
    fn canceled_with_future_period_end_is_in_grace() {
        assert!(record("canceled", NOW + 1).is_active(NOW));
    }

    #[test]
    fn canceled_at_or_before_period_end_boundary_is_not_entitled() {
        assert!(!record("canceled", NOW).is_active(NOW));
        assert!(!record("canceled", NOW - 1).is_active(NOW));
    }

    #[test]
    fn deleted_subscription_record_never_gets_grace() {
        let record = MembershipRecord::canceled("sub_1", "cus_1", NOW);
        assert_eq!(record.status, "canceled");
        assert_eq!(record.current_period_end, 0);
        assert!(!record.is_active(0));
        assert!(!record.is_active(NOW));
    }

    #[test]
    fn other_statuses_are_not_entitled() {
        for status in [
            "past_due",
            "incomplete",
            "incomplete_expired",
            "unpaid",
            "paused",
            "something_new",
        ] {
            assert!(!record(status, NOW + 10_000).is_active(NOW), "{}", status);
        }
    }

    #[test]
    fn record_serializes_with_snake_case_keys() {
        let json = serde_json::to_value(record("active", 1_999_999_999)).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["subscription_id"], "sub_1");
        assert_eq!(json["customer_id"], "cus_1");
        assert_eq!(json["current_period_end"], 1_999_999_999i64);
        assert_eq!(json["updated_at"], NOW);
    }

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let record: MembershipRecord =
            serde_json::from_str(r#"{"status":"canceled","subscription_id":"sub_9"}"#).unwrap();
        assert_eq!(record.current_period_end, 0);
        assert_eq!(record.customer_id, "");
        assert!(!record.is_active(NOW));
    }

    fn any_status() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("active".to_string()),
            Just("trialing".to_string()),
            Just("past_due".to_string()),
            Just("canceled".to_string()),
            Just("incomplete".to_string()),
            Just("incomplete_expired".to_string()),
            Just("unpaid".to_string()),
            Just("paused".to_string()),
            "[a-z_]{0,12}",
        ]
    }

    proptest! {
        #[test]
        fn entitlement_rule_holds_for_all_records(
            status in any_status(),
            period_end in -1_000_000i64..4_000_000_000i64,
            now in 0i64..4_000_000_000i64,
        ) {
            let record = record(&status, period_end);
            let expected = status == "active"
                || status == "trialing"
                || (status == "canceled" && period_end > now);
            prop_assert_eq!(record.is_active(now), expected);
        }
    }
}
