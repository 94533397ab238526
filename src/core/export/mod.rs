//! Extraction orchestration and reporting
//!
//! This module provides the gated export logic for Vigil, including:
//! - Run orchestration behind the integrity verdict
//! - Per-entity outcomes and the run summary

pub mod orchestrator;
pub mod summary;

pub use orchestrator::ExtractionOrchestrator;
pub use summary::{ExtractionOutcome, HaltReason, RunStatus, RunSummary};
