//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the result of one
//! pipeline run.

use crate::adapters::flatfile::ExportReceipt;
use crate::core::integrity::IntegrityVerdict;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Why a run stopped before extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum HaltReason {
    /// The integrity verdict did not pass
    IntegrityFailed,
    /// No query session could be opened
    SessionUnavailable(String),
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every configured entity had an export attempt
    Completed,
    /// No extraction was attempted
    Halted { cause: HaltReason },
}

/// Result of exporting one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutcome {
    /// Entity name
    pub entity: String,

    /// Dataset name handed to the sink
    pub dataset: String,

    /// Rows exported (0 on failure)
    pub row_count: usize,

    /// Whether the export succeeded
    pub success: bool,

    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Where the dataset was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Checksum of the written dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Time spent on fetch, shaping and write
    pub duration_ms: u64,
}

impl ExtractionOutcome {
    /// Successful export described by `receipt`
    pub fn succeeded(entity: impl Into<String>, receipt: ExportReceipt, duration: Duration) -> Self {
        Self {
            entity: entity.into(),
            dataset: receipt.dataset,
            row_count: receipt.rows_written,
            success: true,
            error: None,
            location: Some(receipt.location),
            checksum: receipt.checksum,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Failed export
    pub fn failed(
        entity: impl Into<String>,
        dataset: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            entity: entity.into(),
            dataset: dataset.into(),
            row_count: 0,
            success: false,
            error: Some(error.into()),
            location: None,
            checksum: None,
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique run identifier
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Terminal state
    pub status: RunStatus,

    /// Integrity verdict (absent when no session could be opened)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<IntegrityVerdict>,

    /// Export outcomes in entity order; empty when halted
    pub outcomes: Vec<ExtractionOutcome>,

    /// Whether the export sink was a dry run
    pub dry_run: bool,

    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Create a new run summary
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            status: RunStatus::Completed,
            verdict: None,
            outcomes: Vec::new(),
            dry_run: false,
            duration_ms: 0,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Marks the run as halted
    pub fn halt(&mut self, cause: HaltReason) {
        self.status = RunStatus::Halted { cause };
    }

    /// Whether the run stopped before extraction
    pub fn halted(&self) -> bool {
        matches!(self.status, RunStatus::Halted { .. })
    }

    /// Halt cause, if halted
    pub fn halt_reason(&self) -> Option<&HaltReason> {
        match &self.status {
            RunStatus::Halted { cause } => Some(cause),
            RunStatus::Completed => None,
        }
    }

    /// Number of successful exports
    pub fn exported_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    /// Number of failed exports
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// Rows exported across all entities
    pub fn total_rows_exported(&self) -> usize {
        self.outcomes.iter().map(|o| o.row_count).sum()
    }

    /// Completed and every export succeeded
    pub fn is_successful(&self) -> bool {
        !self.halted() && self.failed_count() == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        match self.halt_reason() {
            Some(cause) => tracing::warn!(
                run_id = %self.run_id,
                cause = ?cause,
                duration_ms = self.duration_ms,
                "Run halted before extraction"
            ),
            None => tracing::info!(
                run_id = %self.run_id,
                exported = self.exported_count(),
                failed = self.failed_count(),
                rows = self.total_rows_exported(),
                dry_run = self.dry_run,
                duration_ms = self.duration_ms,
                "Run completed"
            ),
        }

        for outcome in self.outcomes.iter().filter(|o| !o.success) {
            tracing::warn!(
                entity = %outcome.entity,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Entity export failed"
            );
        }
    }

    /// Format the summary as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Run {}\n", self.run_id));
        summary.push_str(&format!("  Started at: {}\n", self.started_at));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));

        if let Some(verdict) = &self.verdict {
            summary.push_str(&format!(
                "\nIntegrity (threshold {}): {}\n",
                verdict.threshold(),
                if verdict.overall_passed() { "PASSED" } else { "FAILED" }
            ));
            for result in verdict.results() {
                summary.push_str(&format!(
                    "  {} {}: {} rows, {} nulls, ratio {:.4}\n",
                    if result.passed() { "✅" } else { "❌" },
                    result.entity(),
                    result.total_count(),
                    result.null_count(),
                    result.null_ratio()
                ));
            }
            if let Some(failure) = verdict.failure() {
                summary.push_str(&format!("  ⚠️  Check aborted: {}\n", failure.message));
            }
        }

        match self.halt_reason() {
            Some(HaltReason::IntegrityFailed) => {
                summary.push_str("\n🛑 Halted: integrity check failed, nothing was exported\n");
            }
            Some(HaltReason::SessionUnavailable(e)) => {
                summary.push_str(&format!("\n🛑 Halted: query session unavailable: {e}\n"));
            }
            None => {
                summary.push_str(&format!(
                    "\nExports{}: {} succeeded, {} failed, {} rows\n",
                    if self.dry_run { " (dry run)" } else { "" },
                    self.exported_count(),
                    self.failed_count(),
                    self.total_rows_exported()
                ));
                for outcome in &self.outcomes {
                    if outcome.success {
                        summary.push_str(&format!(
                            "  ✅ {}: {} rows -> {}\n",
                            outcome.entity,
                            outcome.row_count,
                            outcome.location.as_deref().unwrap_or("-")
                        ));
                    } else {
                        summary.push_str(&format!(
                            "  ❌ {}: {}\n",
                            outcome.entity,
                            outcome.error.as_deref().unwrap_or("unknown error")
                        ));
                    }
                }
            }
        }

        summary
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
