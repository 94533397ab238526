//! Export command implementation
//!
//! This module implements the `export` command: one integrity-gated
//! extraction run from PostgreSQL to CSV files.

use super::{
    build_event_log, EXIT_CONFIG_ERROR, EXIT_CONNECTIVITY, EXIT_HALTED, EXIT_PARTIAL,
    EXIT_SUCCESS,
};
use crate::adapters::database::create_session_source;
use crate::adapters::flatfile::{CsvExportSink, DryRunSink, ExportSink};
use crate::config::{load_config, VigilConfig};
use crate::core::export::{ExtractionOrchestrator, HaltReason, RunSummary};
use crate::core::integrity::IntegrityChecker;
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Dry run mode - run the integrity gate but write no files
    #[arg(long)]
    pub dry_run: bool,

    /// Override the highest tolerated null ratio (0.0 - 1.0)
    #[arg(long, value_name = "RATIO")]
    pub max_null_ratio: Option<f64>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let checker = IntegrityChecker::from_config(&config.integrity)?;
        let source = match create_session_source(&config) {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(&e, "Failed to set up database access");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let dry_run = config.application.dry_run;
        let csv_sink = CsvExportSink::from_config(&config.export);
        let sink: Box<dyn ExportSink> = if dry_run {
            tracing::info!("Dry run mode enabled - no files will be written");
            if !self.json {
                println!("🔍 DRY RUN MODE - No files will be written");
                println!();
            }
            Box::new(DryRunSink::new(csv_sink))
        } else {
            Box::new(csv_sink)
        };

        let log = build_event_log(&config);
        let orchestrator = ExtractionOrchestrator::new(checker).with_dry_run(dry_run);

        let summary = orchestrator
            .run(&config.entities, source.as_ref(), sink.as_ref(), &log)
            .await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{}", summary.format_summary());
        }

        Ok(exit_code(&summary))
    }

    fn apply_overrides(&self, config: &mut VigilConfig) {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Some(ratio) = self.max_null_ratio {
            tracing::info!(max_null_ratio = ratio, "Overriding integrity threshold from CLI");
            config.integrity.max_null_ratio = ratio;
        }
    }
}

/// Maps the terminal state of a run onto the process exit code
pub fn exit_code(summary: &RunSummary) -> i32 {
    match summary.halt_reason() {
        Some(HaltReason::SessionUnavailable(_)) => EXIT_CONNECTIVITY,
        Some(HaltReason::IntegrityFailed) => EXIT_HALTED,
        None if summary.failed_count() > 0 => EXIT_PARTIAL,
        None => EXIT_SUCCESS,
    }
}
