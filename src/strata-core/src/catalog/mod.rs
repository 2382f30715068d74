//! Partition metadata as recorded by table catalogs and file layouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use common_error::StrataResult;

use crate::schema::Schema;
use crate::types::Value;

/// Storage property naming the time zone used for the table's timestamps.
pub const TIME_ZONE_PROPERTY: &str = "timeZone";

/// Fully qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableIdentifier {
    /// Database the table lives in, if qualified.
    pub database: Option<String>,
    /// Table name.
    pub table: String,
}

impl TableIdentifier {
    /// Create an unqualified identifier.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            database: None,
            table: table.into(),
        }
    }

    /// Create a database-qualified identifier.
    pub fn qualified(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.database {
            Some(db) => write!(f, "{db}.{}", self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

/// Physical storage description of a catalog table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFormat {
    /// Root location of the table's data.
    pub location: Option<String>,
    /// Free-form storage properties (serde options, time zone, ...).
    pub properties: BTreeMap<String, String>,
}

impl StorageFormat {
    /// Set the storage location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add a storage property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a property ignoring the case of its key.
    pub fn property_ignore_case(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Table definition as stored in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    /// Table identifier.
    pub identifier: TableIdentifier,
    /// All columns: data columns followed by partition columns.
    pub schema: Schema,
    /// Declared partition columns, in partition order.
    pub partition_column_names: Vec<String>,
    /// Storage description.
    pub storage: StorageFormat,
}

impl CatalogTable {
    /// Create a table definition.
    pub fn new(
        identifier: TableIdentifier,
        schema: Schema,
        partition_column_names: Vec<String>,
    ) -> Self {
        Self {
            identifier,
            schema,
            partition_column_names,
            storage: StorageFormat::default(),
        }
    }

    /// Replace the storage description.
    pub fn with_storage(mut self, storage: StorageFormat) -> Self {
        self.storage = storage;
        self
    }

    /// Whether the table declares any partition column.
    pub fn is_partitioned(&self) -> bool {
        !self.partition_column_names.is_empty()
    }

    /// Schema of the partition columns, in partition order.
    pub fn partition_schema(&self) -> StrataResult<Schema> {
        let columns = self
            .partition_column_names
            .iter()
            .map(|name| self.schema.resolve_ignore_case(name).cloned())
            .collect::<StrataResult<Vec<_>>>()?;
        Ok(Schema::with_columns(columns))
    }

    /// Time zone recorded in the table's storage properties, if any.
    pub fn time_zone_property(&self) -> Option<&str> {
        self.storage.property_ignore_case(TIME_ZONE_PROPERTY)
    }
}

/// Raw partition-column values of one catalog partition.
///
/// Values are kept as the strings the catalog recorded; see
/// [`crate::types::cast_partition_value`] for typing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec(BTreeMap<String, String>);

impl PartitionSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Look up a column value, preferring an exact name match and falling
    /// back to a case-insensitive one.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .get(column)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(column))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Iterate over `(column, raw value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of columns in the spec.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the spec has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PartitionSpec {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One partition of a catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPartition {
    /// Partition-column values.
    pub spec: PartitionSpec,
    /// Location of the partition's data.
    pub location: Option<String>,
}

impl CatalogPartition {
    /// Create a partition without a location.
    pub fn new(spec: PartitionSpec) -> Self {
        Self {
            spec,
            location: None,
        }
    }

    /// Set the partition location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// One partition directory discovered under a file-based relation.
///
/// `values` are already typed and ordered like the relation's partition
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionDirectory {
    /// Partition-column values in partition-schema order.
    pub values: Vec<Value>,
    /// Data files under the directory.
    pub files: Vec<String>,
}

impl PartitionDirectory {
    /// Create a partition directory.
    pub fn new(values: Vec<Value>, files: Vec<String>) -> Self {
        Self { values, files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnInfo;
    use crate::types::DataType;

    fn sales() -> CatalogTable {
        CatalogTable::new(
            TableIdentifier::qualified("shop", "sales"),
            Schema::with_columns(vec![
                ColumnInfo::new("amount", DataType::Float64),
                ColumnInfo::new("region", DataType::String),
                ColumnInfo::new("day", DataType::Date),
            ]),
            vec!["Region".to_string(), "day".to_string()],
        )
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(TableIdentifier::qualified("shop", "sales").to_string(), "shop.sales");
        assert_eq!(TableIdentifier::new("sales").to_string(), "sales");
    }

    #[test]
    fn test_partition_schema_order() {
        let schema = sales().partition_schema().unwrap();
        assert_eq!(schema.column_names(), vec!["region", "day"]);
    }

    #[test]
    fn test_partition_schema_missing_column() {
        let mut table = sales();
        table.partition_column_names.push("hour".to_string());
        assert!(table.partition_schema().is_err());
    }

    #[test]
    fn test_time_zone_property_is_case_insensitive() {
        let table =
            sales().with_storage(StorageFormat::default().with_property("TIMEZONE", "+01:00"));
        assert_eq!(table.time_zone_property(), Some("+01:00"));
        assert_eq!(sales().time_zone_property(), None);
    }

    #[test]
    fn test_partition_spec_lookup() {
        let spec: PartitionSpec = [("region", "us"), ("day", "2024-01-01")].into_iter().collect();
        assert_eq!(spec.get("region"), Some("us"));
        assert_eq!(spec.get("REGION"), Some("us"));
        assert_eq!(spec.get("hour"), None);
        assert_eq!(spec.len(), 2);
    }
}
