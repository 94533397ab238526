//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Vigil using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Vigil - integrity-gated PostgreSQL to CSV extraction
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(version, about, long_about = None)]
#[command(author = "Vigil Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vigil.toml", env = "VIGIL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VIGIL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check data integrity and export every entity if the check passes
    Export(commands::export::ExportArgs),

    /// Run the integrity check only; never exports
    Check(commands::check::CheckArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command reads the configuration file
    pub fn uses_config(&self) -> bool {
        !matches!(self, Commands::Init(_))
    }
}
