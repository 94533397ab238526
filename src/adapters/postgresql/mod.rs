//! PostgreSQL query access
//!
//! Implements the session capability on top of a `deadpool-postgres` pool.

pub mod client;
pub mod session;
pub mod sql;

pub use client::PostgresSessionSource;
pub use session::PostgresSession;
