//! Data integrity checking
//!
//! For every monitored entity the checker counts all rows and the rows with a
//! NULL in any required column, derives the null ratio and compares it with the
//! configured threshold. The per-entity [`IntegrityResult`]s are aggregated into
//! one [`IntegrityVerdict`] that gates extraction.

pub mod checker;
pub mod verdict;

pub use checker::{IntegrityChecker, DEFAULT_MAX_NULL_RATIO};
pub use verdict::{CheckFailure, IntegrityResult, IntegrityVerdict};
