// Vigil - Integrity-gated PostgreSQL to CSV extraction
// Copyright (c) 2025 Vigil Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use vigil::cli::commands::EXIT_FATAL;
use vigil::cli::{Cli, Commands};
use vigil::config::{load_config, LoggingConfig};
use vigil::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging follows the configuration file when it loads; commands report
    // load failures themselves
    let loaded = if cli.command.uses_config() {
        load_config(&cli.config).ok()
    } else {
        None
    };
    let (config_level, logging_config) = match loaded {
        Some(config) => (Some(config.application.log_level), config.logging),
        None => (None, LoggingConfig::default()),
    };
    let log_level = cli
        .log_level
        .clone()
        .or(config_level)
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Vigil - integrity-gated extraction"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush the file logger first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config).await,
        Commands::Check(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
