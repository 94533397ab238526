//! External system integrations for Vigil.
//!
//! - [`database`] - Query access layer traits and factory
//! - [`postgresql`] - PostgreSQL implementation of the query access layer
//! - [`flatfile`] - Export sinks (CSV files, dry run)
//! - [`audit_file`] - Daily audit trail files
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. The pipeline only sees the
//! capability traits ([`database::SessionSource`], [`flatfile::ExportSink`],
//! [`crate::core::audit::EventLog`]).
//!
//! ```rust,no_run
//! use vigil::adapters::flatfile::{CsvExportSink, ExportSink};
//!
//! let sink = CsvExportSink::new("extracted").with_prefix("PSQL_");
//! println!("{}", sink.describe());
//! ```

pub mod audit_file;
pub mod database;
pub mod flatfile;
pub mod postgresql;
