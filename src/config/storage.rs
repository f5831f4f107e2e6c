//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Membership store location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding every membership record
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("DATA_FILE"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("memberships.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_file() {
        let config = StorageConfig::default();
        assert_eq!(config.data_file, PathBuf::from("memberships.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_data_file_is_rejected() {
        let config = StorageConfig {
            data_file: PathBuf::new(),
        };
        assert!(config.validate().is_err());
    }
}
