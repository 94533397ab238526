//! Domain models and types for Vigil.
//!
//! The domain layer provides:
//! - **Entity specifications** ([`EntitySpec`], [`ColumnSpec`])
//! - **Typed rows** ([`Value`], [`Record`], [`Dataset`])
//! - **Error types** ([`VigilError`], [`QueryError`], [`ExportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Typed rows
//!
//! Rows are never handled as loose tuples. A [`Record`] holds one typed value per
//! declared column and is only turned into exportable form through
//! [`Dataset::shape`], which checks it against the entity's schema:
//!
//! ```rust
//! use vigil::domain::{ColumnSpec, Dataset, EntitySpec, Record, Value};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let customers = EntitySpec::builder("customers")
//!     .key_column("id")
//!     .column(ColumnSpec::new("id").required())
//!     .column(ColumnSpec::new("name").required())
//!     .build()?;
//!
//! let rows = vec![Record::new(vec![Value::Integer(1), Value::from("Ada")])];
//! let dataset = Dataset::shape(&customers, rows)?;
//! assert_eq!(dataset.get(0, "name"), Some(&Value::from("Ada")));
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod errors;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use entity::{ColumnSpec, EntitySpec, EntitySpecBuilder};
pub use errors::{ExportError, QueryError, VigilError};
pub use record::{Dataset, Record, Value};
pub use result::Result;
