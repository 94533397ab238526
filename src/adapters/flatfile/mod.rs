//! Flat-file export sinks

pub mod csv;
pub mod dry_run;
pub mod traits;

pub use self::csv::CsvExportSink;
pub use dry_run::DryRunSink;
pub use traits::{ExportReceipt, ExportSink};
