//! Export sink traits

use crate::domain::{Dataset, ExportError};
use serde::Serialize;

/// Where and how a dataset was persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    /// Dataset name
    pub dataset: String,

    /// Destination location (file path, or a marker for non-persisting sinks)
    pub location: String,

    /// Number of data rows written (header excluded)
    pub rows_written: usize,

    /// Number of bytes written
    pub bytes_written: u64,

    /// Hex-encoded SHA-256 of the written bytes
    pub checksum: Option<String>,
}

/// Persists named tabular datasets
///
/// Writing a dataset replaces any previous dataset of the same name. Sinks
/// create whatever destination container they need.
pub trait ExportSink: Send + Sync {
    /// Persists `dataset`
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the destination cannot be prepared or written.
    fn write(&self, dataset: &Dataset) -> Result<ExportReceipt, ExportError>;

    /// Human-readable description of the destination
    fn describe(&self) -> String;
}
