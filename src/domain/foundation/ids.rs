//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Canonical identifier of a user in the calling applications.
///
/// Identifiers are trimmed and lower-cased on construction, so `" Alice "`
/// and `"alice"` address the same membership record. The canonical form is
/// what gets stored, looked up and written back into Stripe metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if blank.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let canonical = id.as_ref().trim().to_lowercase();
        if canonical.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(canonical))
    }

    /// Parses an optional raw value, treating blank input as absent.
    pub fn parse_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::new(value).ok())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_trimmed_and_lowercased() {
        let id = UserId::new("  Alice@Example.COM ").unwrap();
        assert_eq!(id.as_str(), "alice@example.com");
    }

    #[test]
    fn user_ids_differing_by_case_are_equal() {
        assert_eq!(UserId::new("Bob").unwrap(), UserId::new("bob").unwrap());
    }

    #[test]
    fn blank_user_id_is_rejected() {
        assert!(matches!(
            UserId::new("   "),
            Err(ValidationError::EmptyField { .. })
        ));
        assert!(UserId::new("").is_err());
    }

    #[test]
    fn parse_optional_treats_blank_as_absent() {
        assert_eq!(UserId::parse_optional(None), None);
        assert_eq!(UserId::parse_optional(Some(" ")), None);
        assert_eq!(
            UserId::parse_optional(Some("U1")),
            Some(UserId::new("u1").unwrap())
        );
    }

    #[test]
    fn deserializing_canonicalizes() {
        let id: UserId = serde_json::from_str("\" CAROL \"").unwrap();
        assert_eq!(id.as_str(), "carol");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"carol\"");
    }

    #[test]
    fn deserializing_blank_fails() {
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
