//! CSV flat-file sink
//!
//! Each dataset is written to `<output_dir>/<file_prefix><dataset>.csv`. The
//! file is rendered in memory, written next to the target under a temporary
//! name and renamed into place, so an existing export is only replaced by a
//! complete one.

use super::traits::{ExportReceipt, ExportSink};
use crate::config::ExportConfig;
use crate::domain::{Dataset, ExportError};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes datasets as CSV files into a directory
#[derive(Debug, Clone)]
pub struct CsvExportSink {
    output_dir: PathBuf,
    file_prefix: String,
    delimiter: u8,
}

impl CsvExportSink {
    /// Creates a sink writing comma-separated files into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: String::new(),
            delimiter: b',',
        }
    }

    /// Creates a sink from the export configuration
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.output_dir)
            .with_prefix(&config.file_prefix)
            .with_delimiter(config.delimiter_byte())
    }

    /// Prepends `prefix` to every file name
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Uses `delimiter` as field separator
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Field separator used when rendering
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Path the dataset named `dataset` is written to
    pub fn path_for(&self, dataset: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.csv", self.file_prefix, dataset))
    }

    fn prepare_dir(&self) -> Result<(), ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ExportError::Destination {
            path: self.output_dir.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl ExportSink for CsvExportSink {
    fn write(&self, dataset: &Dataset) -> Result<ExportReceipt, ExportError> {
        self.prepare_dir()?;

        let bytes = render_csv(dataset, self.delimiter).map_err(|e| ExportError::WriteFailed {
            dataset: dataset.name().to_string(),
            message: e.to_string(),
        })?;

        let path = self.path_for(dataset.name());
        write_replacing(&path, &bytes).map_err(|e| ExportError::WriteFailed {
            dataset: dataset.name().to_string(),
            message: format!("{}: {e}", path.display()),
        })?;

        tracing::debug!(
            dataset = %dataset.name(),
            path = %path.display(),
            rows = dataset.row_count(),
            bytes = bytes.len(),
            "Dataset written"
        );

        Ok(ExportReceipt {
            dataset: dataset.name().to_string(),
            location: path.display().to_string(),
            rows_written: dataset.row_count(),
            bytes_written: bytes.len() as u64,
            checksum: Some(calculate_checksum_bytes(&bytes)),
        })
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.output_dir.display())
    }
}

/// Renders a dataset as CSV: one header line, then one line per row
pub fn render_csv(dataset: &Dataset, delimiter: u8) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.values().iter().map(|v| v.to_field()))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Calculate SHA-256 checksum of raw bytes
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    replace_via_temp(path, |tmp| fs::write(tmp, bytes))
}

/// Runs `write` against `<path>.tmp` and renames the result over `path`
///
/// The temporary file is removed whenever either step fails.
fn replace_via_temp(
    path: &Path,
    write: impl FnOnce(&Path) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    write(&tmp)
        .and_then(|()| fs::rename(&tmp, path))
        .inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnSpec, EntitySpec, Record, Value};
    use tempfile::TempDir;

    fn customers(rows: Vec<Record>) -> Dataset {
        let spec = EntitySpec::builder("customers")
            .key_column("id")
            .column(ColumnSpec::new("id").required())
            .column(ColumnSpec::new("name").required())
            .build()
            .unwrap();
        Dataset::shape(&spec, rows).unwrap()
    }

    #[test]
    fn test_render_csv_header_and_nulls() {
        let dataset = customers(vec![
            Record::new(vec![Value::Integer(1), Value::from("Ada, Countess")]),
            Record::new(vec![Value::Integer(2), Value::Null]),
        ]);
        let bytes = render_csv(&dataset, b',').unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "id,name\n1,\"Ada, Countess\"\n2,\n");
    }

    #[test]
    fn test_write_creates_directory_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("extracted");
        let sink = CsvExportSink::new(&out).with_prefix("PSQL_");

        let first = customers(vec![
            Record::new(vec![Value::Integer(1), Value::from("Ada")]),
            Record::new(vec![Value::Integer(2), Value::from("Grace")]),
        ]);
        sink.write(&first).unwrap();

        let second = customers(vec![Record::new(vec![Value::Integer(3), Value::from("Edsger")])]);
        let receipt = sink.write(&second).unwrap();

        let path = out.join("PSQL_customers.csv");
        assert_eq!(receipt.location, path.display().to_string());
        assert_eq!(receipt.rows_written, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,name\n3,Edsger\n");
        assert!(!out.join("PSQL_customers.csv.tmp").exists());
    }

    #[test]
    fn test_receipt_checksum_matches_file() {
        let temp = TempDir::new().unwrap();
        let sink = CsvExportSink::new(temp.path());
        let receipt = sink
            .write(&customers(vec![Record::new(vec![
                Value::Integer(1),
                Value::from("Ada"),
            ])]))
            .unwrap();

        let written = fs::read(temp.path().join("customers.csv")).unwrap();
        assert_eq!(receipt.bytes_written, written.len() as u64);
        assert_eq!(receipt.checksum, Some(calculate_checksum_bytes(&written)));
    }

    #[test]
    fn test_custom_delimiter() {
        let dataset = customers(vec![Record::new(vec![Value::Integer(1), Value::from("Ada")])]);
        let text = String::from_utf8(render_csv(&dataset, b';').unwrap()).unwrap();
        assert_eq!(text, "id;name\n1;Ada\n");
    }

    #[test]
    fn test_calculate_checksum_bytes_deterministic() {
        let checksum1 = calculate_checksum_bytes(b"Test data");
        let checksum2 = calculate_checksum_bytes(b"Test data");

        assert_eq!(checksum1, checksum2);
        assert_eq!(checksum1.len(), 64);
        assert!(checksum1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_failed_write_removes_partial_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("customers.csv");
        fs::write(&path, "id,name\n1,Ada\n").unwrap();

        let err = replace_via_temp(&path, |tmp| {
            fs::write(tmp, "id,na")?;
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "No space left on device",
            ))
        })
        .unwrap_err();

        assert!(err.to_string().contains("No space left"));
        assert!(!temp.path().join("customers.csv.tmp").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,name\n1,Ada\n");
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();

        let sink = CsvExportSink::new(&blocker);
        let err = sink
            .write(&customers(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ExportError::Destination { .. }));
    }
}
