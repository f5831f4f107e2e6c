//! Stripe subscription status vocabulary.
//!
//! Records keep Stripe's raw status string; this enum is how the domain
//! interprets it when deciding entitlement.

use serde::{Deserialize, Serialize};

/// Subscription status as reported by Stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,

    /// In a free trial.
    Trialing,

    /// Latest invoice failed, Stripe is retrying.
    PastDue,

    /// Canceled. May still be paid through the current period.
    Canceled,

    /// First payment has not completed yet.
    Incomplete,

    /// First payment never completed.
    IncompleteExpired,

    /// Retries exhausted without payment.
    Unpaid,

    /// Collection paused.
    Paused,

    /// Anything Stripe sends that we do not know about.
    Unknown,
}

impl SubscriptionStatus {
    /// Parses Stripe's status string. Unrecognized values map to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "unpaid" => Self::Unpaid,
            "paused" => Self::Paused,
            _ => Self::Unknown,
        }
    }

    /// Stripe's wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
            Self::Unknown => "unknown",
        }
    }

    /// Statuses that grant access regardless of the period end.
    pub fn grants_access(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [SubscriptionStatus; 8] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trialing,
        SubscriptionStatus::PastDue,
        SubscriptionStatus::Canceled,
        SubscriptionStatus::Incomplete,
        SubscriptionStatus::IncompleteExpired,
        SubscriptionStatus::Unpaid,
        SubscriptionStatus::Paused,
    ];

    #[test]
    fn known_statuses_parse_from_their_wire_string() {
        for status in KNOWN {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        assert_eq!(SubscriptionStatus::parse("ACTIVE"), SubscriptionStatus::Unknown);
        assert_eq!(SubscriptionStatus::parse(""), SubscriptionStatus::Unknown);
        assert_eq!(SubscriptionStatus::parse("expired"), SubscriptionStatus::Unknown);
    }

    #[test]
    fn only_active_and_trialing_grant_access() {
        for status in KNOWN {
            let expected = matches!(
                status,
                SubscriptionStatus::Active | SubscriptionStatus::Trialing
            );
            assert_eq!(status.grants_access(), expected, "{}", status);
        }
        assert!(!SubscriptionStatus::Unknown.grants_access());
    }
}
