//! Check command implementation
//!
//! Runs the integrity check against the configured entities and reports the
//! verdict. Nothing is exported.

use super::{
    build_event_log, EXIT_CONFIG_ERROR, EXIT_CONNECTIVITY, EXIT_HALTED, EXIT_SUCCESS,
};
use crate::adapters::database::create_session_source;
use crate::config::load_config;
use crate::core::export::ExtractionOrchestrator;
use crate::core::integrity::{IntegrityChecker, IntegrityVerdict};
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Override the highest tolerated null ratio (0.0 - 1.0)
    #[arg(long, value_name = "RATIO")]
    pub max_null_ratio: Option<f64>,

    /// Print the verdict as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if let Some(ratio) = self.max_null_ratio {
            config.integrity.max_null_ratio = ratio;
        }

        let checker = match IntegrityChecker::from_config(&config.integrity) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };
        let source = match create_session_source(&config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let log = build_event_log(&config);
        let orchestrator = ExtractionOrchestrator::new(checker);

        let verdict = match orchestrator
            .check(&config.entities, source.as_ref(), &log)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                log_error_with_context!(&e, "Integrity check could not start");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONNECTIVITY);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        } else {
            print_verdict(&verdict);
        }

        Ok(if verdict.overall_passed() {
            EXIT_SUCCESS
        } else {
            EXIT_HALTED
        })
    }
}

fn print_verdict(verdict: &IntegrityVerdict) {
    println!("🔍 Integrity check (threshold {})", verdict.threshold());
    println!();
    for result in verdict.results() {
        println!(
            "  {} {}: {} rows, {} nulls, ratio {:.4}",
            if result.passed() { "✅" } else { "❌" },
            result.entity(),
            result.total_count(),
            result.null_count(),
            result.null_ratio()
        );
    }
    println!();
    if verdict.overall_passed() {
        println!("✅ Data is fit for export");
    } else {
        println!("❌ Extraction would be halted: {}", verdict.describe());
    }
}
