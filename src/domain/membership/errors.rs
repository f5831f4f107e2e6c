//! Membership-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Unauthorized | 401 |
//! | MissingRequiredField | 400 |
//! | MissingPlanConfiguration | 500 |
//! | Provider | 502 on the checkout route, 500 on the webhook route |
//! | Storage | 500 |
//!
//! A webhook without a resolvable user identifier is not an error; the
//! reconciler reports it as a skipped outcome.

use thiserror::Error;

/// Membership-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// Missing or wrong internal bearer credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// A required request field was absent or blank.
    #[error("missing {0}")]
    MissingRequiredField(&'static str),

    /// No Stripe price is configured for the requested plan.
    #[error("missing price configuration for plan '{0}'")]
    MissingPlanConfiguration(String),

    /// A call to the payment provider failed.
    #[error("payment provider error: {message}")]
    Provider { message: String, retryable: bool },

    /// The membership store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl MembershipError {
    pub fn missing_field(field: &'static str) -> Self {
        MembershipError::MissingRequiredField(field)
    }

    pub fn missing_plan(plan_key: impl Into<String>) -> Self {
        MembershipError::MissingPlanConfiguration(plan_key.into())
    }

    pub fn provider(message: impl Into<String>, retryable: bool) -> Self {
        MembershipError::Provider {
            message: message.into(),
            retryable,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        MembershipError::Storage(message.into())
    }

    /// Returns true if redelivering the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MembershipError::Provider { retryable, .. } => *retryable,
            MembershipError::Storage(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_field() {
        assert_eq!(
            MembershipError::missing_field("user_id").to_string(),
            "missing user_id"
        );
    }

    #[test]
    fn missing_plan_message_names_plan() {
        assert_eq!(
            MembershipError::missing_plan("annual").to_string(),
            "missing price configuration for plan 'annual'"
        );
    }

    #[test]
    fn retryability() {
        assert!(MembershipError::storage("disk full").is_retryable());
        assert!(MembershipError::provider("timeout", true).is_retryable());
        assert!(!MembershipError::provider("bad request", false).is_retryable());
        assert!(!MembershipError::Unauthorized.is_retryable());
        assert!(!MembershipError::missing_field("user_id").is_retryable());
    }
}
