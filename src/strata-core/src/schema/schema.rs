//! Schema definition for Strata relations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use common_error::{StrataError, StrataResult};

use crate::types::DataType;

/// Information about a column in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether this column can contain nulls.
    pub nullable: bool,
}

impl ColumnInfo {
    /// Create a new column info.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    /// Set nullable for this column.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Ordered set of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Columns in this schema.
    pub columns: Vec<ColumnInfo>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema with the given columns.
    pub fn with_columns(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    /// Add a column to the schema.
    pub fn add_column(&mut self, column: ColumnInfo) {
        self.columns.push(column);
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find a column by exact name.
    pub fn field(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find a column ignoring ASCII case.
    pub fn field_ignore_case(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a column ignoring ASCII case, failing with the available
    /// column names when it is absent.
    pub fn resolve_ignore_case(&self, name: &str) -> StrataResult<&ColumnInfo> {
        self.field_ignore_case(name)
            .ok_or_else(|| StrataError::column_not_found(name, self.column_names()))
    }

    /// Index from lower-cased column name to position.
    pub fn lowercase_index(&self) -> HashMap<String, usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_lowercase(), i))
            .collect()
    }

    /// Check if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Concatenate two schemas.
    pub fn merge(&self, other: &Schema) -> Self {
        Self {
            columns: self.columns.iter().chain(&other.columns).cloned().collect(),
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Schema {{")?;
        for col in &self.columns {
            writeln!(
                f,
                "  {}: {} {}",
                col.name,
                col.data_type,
                if col.nullable { "(nullable)" } else { "" }
            )?;
        }
        write!(f, "}}")
    }
}
