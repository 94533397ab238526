//! Session source factory
//!
//! This module provides factory functions to create query session sources based
//! on configuration.

use crate::adapters::database::traits::SessionSource;
use crate::adapters::postgresql::PostgresSessionSource;
use crate::config::schema::VigilConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create a session source from the `[postgresql]` configuration
///
/// # Errors
///
/// Returns an error if the connection settings are unusable. No connection is
/// attempted here; connectivity failures surface when a run acquires a session.
pub fn create_session_source(config: &VigilConfig) -> Result<Arc<dyn SessionSource>> {
    tracing::info!("Creating PostgreSQL session source");
    let source = PostgresSessionSource::new(&config.postgresql)?;
    Ok(Arc::new(source) as Arc<dyn SessionSource>)
}
