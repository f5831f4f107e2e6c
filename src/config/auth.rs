//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Internal API authentication for client applications
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared bearer key presented by client applications
    #[serde(default = "empty_secret")]
    pub internal_api_key: SecretString,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.internal_api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("INTERNAL_API_KEY"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            internal_api_key: empty_secret(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_rejected() {
        assert_eq!(
            AuthConfig::default().validate(),
            Err(ValidationError::MissingRequired("INTERNAL_API_KEY"))
        );

        let config = AuthConfig {
            internal_api_key: SecretString::new("   ".to_string()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_key() {
        let config = AuthConfig {
            internal_api_key: SecretString::new("k3y".to_string()),
        };
        assert!(config.validate().is_ok());
        assert!(!format!("{:?}", config).contains("k3y"));
    }
}
