//! Domain error types
//!
//! This module defines the error hierarchy for Vigil. Errors are domain-specific
//! and don't expose third-party driver or writer types to callers.

use thiserror::Error;

/// Main Vigil error type
///
/// This is the primary error type used throughout the application.
/// It wraps the capability-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The query store could not be reached or a session could not be opened
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Query-related errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Export sink errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised by the query access layer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    /// The connection was lost or could not be used
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The statement failed on the server
    #[error("Query failed: {0}")]
    Failed(String),

    /// A column has a type that cannot be represented as a [`crate::domain::Value`]
    #[error("Unsupported column type for {column}: {type_name}")]
    UnsupportedType { column: String, type_name: String },

    /// Counts returned by the store are inconsistent
    #[error("Inconsistent counts for {entity}: {null_count} null rows out of {total}")]
    InconsistentCounts {
        entity: String,
        total: u64,
        null_count: u64,
    },
}

/// Errors raised while shaping or persisting a dataset
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    /// A fetched record does not match the declared schema
    #[error("Shaping failed for {dataset}: {message}")]
    Shaping { dataset: String, message: String },

    /// The destination could not be prepared (e.g. directory creation)
    #[error("Failed to prepare destination {path}: {message}")]
    Destination { path: String, message: String },

    /// Writing the dataset failed
    #[error("Failed to write dataset {dataset}: {message}")]
    WriteFailed { dataset: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for VigilError {
    fn from(err: std::io::Error) -> Self {
        VigilError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VigilError {
    fn from(err: serde_json::Error) -> Self {
        VigilError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VigilError {
    fn from(err: toml::de::Error) -> Self {
        VigilError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv writer errors
impl From<csv::Error> for VigilError {
    fn from(err: csv::Error) -> Self {
        VigilError::Io(format!("CSV error: {err}"))
    }
}

impl QueryError {
    /// Whether the error means the session can no longer be used
    pub fn is_connectivity(&self) -> bool {
        matches!(self, QueryError::ConnectionLost(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vigil_error_display() {
        let err = VigilError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_query_error_conversion() {
        let query_err = QueryError::ConnectionLost("socket closed".to_string());
        let err: VigilError = query_err.into();
        assert!(matches!(err, VigilError::Query(_)));
    }

    #[test]
    fn test_export_error_conversion() {
        let export_err = ExportError::WriteFailed {
            dataset: "customers".to_string(),
            message: "disk full".to_string(),
        };
        let err: VigilError = export_err.into();
        assert!(matches!(err, VigilError::Export(_)));
        assert!(err.to_string().contains("customers"));
    }

    #[test]
    fn test_inconsistent_counts_display() {
        let err = QueryError::InconsistentCounts {
            entity: "products".to_string(),
            total: 3,
            null_count: 5,
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent counts for products: 5 null rows out of 3"
        );
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(QueryError::ConnectionLost("reset".to_string()).is_connectivity());
        assert!(!QueryError::Failed("syntax".to_string()).is_connectivity());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: VigilError = io_err.into();
        assert!(matches!(err, VigilError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: VigilError = toml_err.into();
        assert!(matches!(err, VigilError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_vigil_error_implements_std_error() {
        let err = VigilError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
