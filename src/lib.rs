// Vigil - Integrity-gated PostgreSQL to CSV extraction
// Copyright (c) 2025 Vigil Contributors
// Licensed under the MIT License

//! # Vigil - integrity-gated extraction
//!
//! Vigil exports relational tables to flat files, but only after the data has
//! passed a completeness check.
//!
//! ## Overview
//!
//! One run:
//! - **Checks** every configured table: total rows, rows with a NULL in any
//!   required column, and the resulting null ratio
//! - **Gates** extraction on the aggregate verdict; a single table above the
//!   threshold, or any query failure, halts the run before anything is written
//! - **Extracts** each table independently into a CSV dataset, so one failing
//!   export never blocks the others
//! - **Audits** every step to a daily log file
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Integrity checking, gated extraction, audit events
//! - [`adapters`] - PostgreSQL sessions, CSV sinks, audit files
//! - [`domain`] - Entity specifications, typed rows, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Diagnostic logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vigil::adapters::database::create_session_source;
//! use vigil::adapters::flatfile::CsvExportSink;
//! use vigil::cli::commands::build_event_log;
//! use vigil::config::load_config;
//! use vigil::core::export::ExtractionOrchestrator;
//! use vigil::core::integrity::IntegrityChecker;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("vigil.toml")?;
//!
//!     let source = create_session_source(&config)?;
//!     let sink = CsvExportSink::from_config(&config.export);
//!     let log = build_event_log(&config);
//!
//!     let orchestrator =
//!         ExtractionOrchestrator::new(IntegrityChecker::from_config(&config.integrity)?);
//!     let summary = orchestrator
//!         .run(&config.entities, source.as_ref(), &sink, &log)
//!         .await;
//!
//!     println!("{}", summary.format_summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible setup code returns [`domain::VigilError`]. A run itself never
//! fails: connectivity problems, failing verdicts and per-table export errors
//! all end up in the [`core::export::RunSummary`] and the audit trail.
//!
//! ## Logging
//!
//! Diagnostic output uses the `tracing` crate. The audit trail is a separate
//! capability, [`core::audit::EventLog`], passed explicitly into the checker
//! and the orchestrator.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
