//! Error types for table cache operations
//!
//! This module defines the error taxonomy shared by the key codec, the query
//! layer and the expiring cache.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TableError {
    /// A required argument was empty, out of range or missing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store reported a failure
    #[error("Store failure: {0}")]
    StoreFailure(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl TableError {
    /// Shorthand for building an `InvalidArgument` error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TableError::InvalidArgument(message.into())
    }

    /// Check whether the error was raised by argument validation
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, TableError::InvalidArgument(_))
    }

    /// Check whether the error came from the backing store
    pub fn is_store_failure(&self) -> bool {
        matches!(self, TableError::StoreFailure(_))
    }
}

/// Result type alias for table operations
pub type Result<T> = std::result::Result<T, TableError>;

impl From<String> for TableError {
    fn from(s: String) -> Self {
        TableError::Other(s)
    }
}

impl From<&str> for TableError {
    fn from(s: &str) -> Self {
        TableError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        TableError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TableError::InvalidArgument("take must be greater than 0".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid argument: take must be greater than 0"
        );

        let error = TableError::StoreFailure("partition scan timed out".to_string());
        assert!(error.to_string().contains("partition scan timed out"));
    }

    #[test]
    fn test_error_conversion() {
        let error: TableError = "test error".into();
        assert!(matches!(error, TableError::Other(_)));

        let error: TableError = "test error".to_string().into();
        assert!(matches!(error, TableError::Other(_)));

        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: TableError = json_error.into();
        assert!(matches!(error, TableError::SerializationError(_)));
    }

    #[test]
    fn test_error_classification() {
        assert!(TableError::invalid_argument("x").is_invalid_argument());
        assert!(TableError::StoreFailure("x".into()).is_store_failure());
        assert!(!TableError::Other("x".into()).is_store_failure());
    }
}
