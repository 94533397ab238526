//! Query access layer
//!
//! This module provides the trait-based abstraction the pipeline uses to read
//! from a relational store, plus a factory for the configured backend.

pub mod factory;
pub mod traits;

pub use factory::create_session_source;
pub use traits::{QuerySession, SessionSource};
