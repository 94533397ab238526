//! Entity specifications
//!
//! An [`EntitySpec`] is the static description of one monitored table: which
//! columns are exported (and under which destination names), which of them are
//! required for completeness checking, and which column identifies a row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One declared column of an entity
///
/// `destination` renames the column in the exported dataset. When absent the
/// source name is reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name in the source table
    pub source: String,

    /// Column name in the exported dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Whether a NULL in this column counts the row as incomplete
    #[serde(default)]
    pub required: bool,
}

impl ColumnSpec {
    /// Creates an optional column exported under its source name
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: None,
            required: false,
        }
    }

    /// Marks the column as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Exports the column under a different name
    pub fn renamed(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Name used in the exported dataset
    pub fn destination_name(&self) -> &str {
        self.destination.as_deref().unwrap_or(&self.source)
    }
}

/// Static description of one monitored table
///
/// # Examples
///
/// ```
/// use vigil::domain::{ColumnSpec, EntitySpec};
///
/// let products = EntitySpec::builder("products")
///     .key_column("id")
///     .column(ColumnSpec::new("id").required())
///     .column(ColumnSpec::new("type").required().renamed("name"))
///     .column(ColumnSpec::new("price"))
///     .build()
///     .unwrap();
///
/// assert_eq!(products.destination_columns(), vec!["id", "name", "price"]);
/// assert_eq!(products.required_columns(), vec!["id", "type"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Logical entity name used in audit messages
    pub name: String,

    /// Source table, optionally schema-qualified. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Primary identifying column; rows where it is NULL are never exported
    pub key_column: String,

    /// Exported dataset name. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Declared columns in export order
    pub columns: Vec<ColumnSpec>,
}

impl EntitySpec {
    /// Returns a builder for an entity with the given name
    pub fn builder(name: impl Into<String>) -> EntitySpecBuilder {
        EntitySpecBuilder::new(name)
    }

    /// Source table name
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }

    /// Exported dataset name
    pub fn dataset_name(&self) -> &str {
        self.dataset.as_deref().unwrap_or(&self.name)
    }

    /// Source column names in declared order
    pub fn source_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.source.as_str()).collect()
    }

    /// Destination column names in declared order
    pub fn destination_columns(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnSpec::destination_name).collect()
    }

    /// Source columns considered for completeness checking
    ///
    /// The key column is always included even when not flagged as required.
    pub fn required_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.required || c.source == self.key_column)
            .map(|c| c.source.as_str())
            .collect()
    }

    /// Validates the specification
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !is_identifier(&self.name) {
            return Err(format!("Invalid entity name '{}'", self.name));
        }

        let table = self.table_name();
        if !table.split('.').all(is_identifier) || table.split('.').count() > 2 {
            return Err(format!("entity '{}': invalid table name '{table}'", self.name));
        }

        if self.dataset_name().is_empty()
            || self
                .dataset_name()
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        {
            return Err(format!(
                "entity '{}': dataset name '{}' must contain only letters, digits, '_' or '-'",
                self.name,
                self.dataset_name()
            ));
        }

        if self.columns.is_empty() {
            return Err(format!("entity '{}': at least one column is required", self.name));
        }

        for column in &self.columns {
            if !is_identifier(&column.source) {
                return Err(format!(
                    "entity '{}': invalid column name '{}'",
                    self.name, column.source
                ));
            }
            if column.destination_name().trim().is_empty() {
                return Err(format!(
                    "entity '{}': column '{}' has an empty destination name",
                    self.name, column.source
                ));
            }
        }

        let mut sources = self.source_columns();
        sources.sort_unstable();
        if sources.windows(2).any(|w| w[0] == w[1]) {
            return Err(format!("entity '{}': duplicate source column", self.name));
        }

        let mut destinations = self.destination_columns();
        destinations.sort_unstable();
        if destinations.windows(2).any(|w| w[0] == w[1]) {
            return Err(format!(
                "entity '{}': duplicate destination column",
                self.name
            ));
        }

        if !self.columns.iter().any(|c| c.source == self.key_column) {
            return Err(format!(
                "entity '{}': key_column '{}' must be one of the declared columns",
                self.name, self.key_column
            ));
        }

        Ok(())
    }
}

impl fmt::Display for EntitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Builder for [`EntitySpec`]
#[derive(Debug)]
pub struct EntitySpecBuilder {
    name: String,
    table: Option<String>,
    key_column: Option<String>,
    dataset: Option<String>,
    columns: Vec<ColumnSpec>,
}

impl EntitySpecBuilder {
    /// Creates a builder for an entity with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            key_column: None,
            dataset: None,
            columns: Vec::new(),
        }
    }

    /// Sets the source table
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets the key column
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Sets the exported dataset name
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Appends a column
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Builds and validates the specification
    ///
    /// # Errors
    ///
    /// Returns an error if the key column is missing or the spec is invalid.
    pub fn build(self) -> Result<EntitySpec, String> {
        let key_column = self
            .key_column
            .ok_or_else(|| format!("entity '{}': key_column is required", self.name))?;

        let spec = EntitySpec {
            name: self.name,
            table: self.table,
            key_column,
            dataset: self.dataset,
            columns: self.columns,
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Whether `s` is a plain SQL identifier (letters, digits, underscores)
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
