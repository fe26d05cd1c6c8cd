//! Error types for the source boundary and configuration validation.

use thiserror::Error;

/// Why a single tick's fetch produced nothing usable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// True when the payload arrived but could not be decoded.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Malformed(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// A configuration that parsed but cannot drive a dashboard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be at least 1 ms")]
    ZeroInterval,

    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("source URL must start with 'http://' or 'https://': {0}")]
    InvalidUrl(String),

    #[error("at least one category must be configured")]
    NoCategories,

    #[error("category '{0}' has no labels")]
    EmptyCategory(String),

    #[error("label '{label}' is mapped to both '{first}' and '{second}'")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("category name '{0}' is used more than once")]
    DuplicateName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_malformed() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.is_malformed());
        assert!(err.to_string().starts_with("malformed payload"));
    }

    #[test]
    fn test_io_error_is_not_malformed() {
        let err: FetchError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_duplicate_label_message() {
        let err = ConfigError::DuplicateLabel {
            label: "defect_B".to_string(),
            first: "Defect B".to_string(),
            second: "Scrap".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "label 'defect_B' is mapped to both 'Defect B' and 'Scrap'"
        );
    }

    #[test]
    fn test_duplicate_name_message() {
        let err = ConfigError::DuplicateName("Defects".to_string());
        assert_eq!(err.to_string(), "category name 'Defects' is used more than once");
    }
}
