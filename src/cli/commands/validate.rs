//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Vigil configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::{load_config, redact_connection_string, VigilConfig};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_CONFIG_ERROR)
            }
        }
    }
}

fn print_summary(config: &VigilConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!(
        "  PostgreSQL Connection: {}",
        redact_connection_string(config.postgresql.connection_string.expose_secret().as_ref())
    );
    println!("  SSL Mode: {}", config.postgresql.ssl_mode);
    println!("  Max Null Ratio: {}", config.integrity.max_null_ratio);
    println!("  Output Directory: {}", config.export.output_dir);
    if config.audit.enabled {
        println!("  Audit Log Directory: {}", config.audit.log_dir);
    } else {
        println!("  Audit Log: disabled");
    }
    println!("  Entities:");
    for entity in &config.entities {
        let columns: Vec<String> = entity
            .columns
            .iter()
            .map(|c| {
                let mut label = c.source.clone();
                if c.destination_name() != c.source {
                    label.push_str(&format!(" -> {}", c.destination_name()));
                }
                if c.required || c.source == entity.key_column {
                    label.push('*');
                }
                label
            })
            .collect();
        println!(
            "    - {} ({} -> {}): {}",
            entity.name,
            entity.table_name(),
            entity.dataset_name(),
            columns.join(", ")
        );
    }
    println!();
    println!("  * required column");
}
