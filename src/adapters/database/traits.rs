//! Query access layer traits
//!
//! These traits define the read-only capability the integrity checker and the
//! extraction orchestrator need from a relational store. Implementations must be
//! idempotent and free of side effects from the pipeline's point of view.

use crate::domain::{EntitySpec, QueryError, Record, Result};
use async_trait::async_trait;

/// Source of query sessions
///
/// A session is acquired once per run and owned exclusively by that run.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Opens a session
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::VigilError::Connectivity`] if the store is unreachable.
    async fn acquire(&self) -> Result<Box<dyn QuerySession>>;

    /// Human-readable description of the store, safe to log (no credentials)
    fn describe(&self) -> String;
}

/// An open query session
///
/// Dropping the session releases it (returns the connection to its pool or
/// closes it).
#[async_trait]
pub trait QuerySession: Send + Sync {
    /// Total number of rows in the entity's table
    async fn count(&self, entity: &EntitySpec) -> std::result::Result<u64, QueryError>;

    /// Number of rows where at least one of `required_columns` is NULL
    ///
    /// An empty column list yields 0.
    async fn count_where_any_null(
        &self,
        entity: &EntitySpec,
        required_columns: &[&str],
    ) -> std::result::Result<u64, QueryError>;

    /// Fetches `columns` (in that order) for every row whose `key_column` is not NULL
    async fn fetch_rows(
        &self,
        entity: &EntitySpec,
        columns: &[&str],
        key_column: &str,
    ) -> std::result::Result<Vec<Record>, QueryError>;
}
