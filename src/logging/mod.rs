//! Diagnostic logging
//!
//! This module provides structured logging with support for:
//! - Console output on stderr (stdout is reserved for command output)
//! - Configurable log levels
//! - Local JSON file logging with rotation
//!
//! Diagnostic logs are separate from the audit trail, which is written through
//! [`crate::core::audit::EventLog`].
//!
//! # Example
//!
//! ```no_run
//! use vigil::logging::init_logging;
//! use vigil::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use vigil::log_error_with_context;
/// use vigil::domain::VigilError;
///
/// let error = VigilError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
