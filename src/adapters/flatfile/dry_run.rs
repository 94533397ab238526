//! Dry-run sink: reports what would be written without touching the filesystem

use super::csv::{calculate_checksum_bytes, render_csv, CsvExportSink};
use super::traits::{ExportReceipt, ExportSink};
use crate::domain::{Dataset, ExportError};

/// Renders datasets like [`CsvExportSink`] but never persists them
#[derive(Debug, Clone)]
pub struct DryRunSink {
    target: CsvExportSink,
}

impl DryRunSink {
    /// Wraps the sink that would have been used
    pub fn new(target: CsvExportSink) -> Self {
        Self { target }
    }
}

impl ExportSink for DryRunSink {
    fn write(&self, dataset: &Dataset) -> Result<ExportReceipt, ExportError> {
        let bytes = render_csv(dataset, self.target.delimiter()).map_err(|e| ExportError::WriteFailed {
            dataset: dataset.name().to_string(),
            message: e.to_string(),
        })?;
        let path = self.target.path_for(dataset.name());

        tracing::info!(
            dataset = %dataset.name(),
            path = %path.display(),
            rows = dataset.row_count(),
            "DRY RUN: Would write {} rows",
            dataset.row_count()
        );

        Ok(ExportReceipt {
            dataset: dataset.name().to_string(),
            location: format!("{} (dry run)", path.display()),
            rows_written: dataset.row_count(),
            bytes_written: bytes.len() as u64,
            checksum: Some(calculate_checksum_bytes(&bytes)),
        })
    }

    fn describe(&self) -> String {
        format!("dry-run ({})", self.target.describe())
    }
}
