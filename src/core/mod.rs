//! Core business logic for Vigil.
//!
//! # Modules
//!
//! - [`audit`] - Audit trail events and the event log capability
//! - [`integrity`] - Null-ratio integrity checking and the aggregate verdict
//! - [`export`] - Gated extraction and run reporting
//!
//! # Run Workflow
//!
//! 1. **Open Session**: Acquire one query session for the run
//! 2. **Check**: Count rows and null rows per entity, compare with the threshold
//! 3. **Gate**: Halt without exporting anything if the verdict fails
//! 4. **Extract**: Fetch, shape and write each entity independently
//! 5. **Report**: Release the session and produce a run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil::adapters::database::create_session_source;
//! use vigil::adapters::flatfile::CsvExportSink;
//! use vigil::config::load_config;
//! use vigil::core::audit::TracingEventLog;
//! use vigil::core::export::ExtractionOrchestrator;
//! use vigil::core::integrity::IntegrityChecker;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("vigil.toml")?;
//! let source = create_session_source(&config)?;
//! let sink = CsvExportSink::from_config(&config.export);
//! let orchestrator = ExtractionOrchestrator::new(IntegrityChecker::from_config(&config.integrity)?);
//!
//! let summary = orchestrator
//!     .run(&config.entities, source.as_ref(), &sink, &TracingEventLog)
//!     .await;
//!
//! println!("Halted: {}", summary.halted());
//! println!("Exported: {}", summary.exported_count());
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod export;
pub mod integrity;
