//! Leaf relations: table scans and synthesized in-memory relations.

use serde::{Deserialize, Serialize};

use strata_core::{CatalogTable, Schema, TableIdentifier, Value};

use crate::attribute::AttributeRef;

fn attributes_of(schema: &Schema) -> Vec<AttributeRef> {
    schema.columns.iter().map(AttributeRef::from_column).collect()
}

fn format_attrs(attrs: &[AttributeRef]) -> String {
    let items: Vec<String> = attrs.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Scan of an unpartitioned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOp {
    /// Scanned table.
    pub table: TableIdentifier,
    /// Produced columns.
    pub output: Vec<AttributeRef>,
}

impl ScanOp {
    /// Scan `table`, allocating one attribute per schema column.
    pub fn new(table: TableIdentifier, schema: &Schema) -> Self {
        Self {
            table,
            output: attributes_of(schema),
        }
    }
}

impl std::fmt::Display for ScanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scan({}, output={})", self.table, format_attrs(&self.output))
    }
}

/// Scan of a file-based relation laid out in partition directories.
///
/// The output lists the data columns followed by the partition columns; a
/// data column sharing a partition column's name (ignoring case) is dropped
/// in favour of the partition column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileScanOp {
    /// Root location of the relation.
    pub location: String,
    /// Columns stored inside the data files.
    pub data_schema: Schema,
    /// Columns encoded in the directory layout, in partition order.
    pub partition_schema: Schema,
    /// Produced columns.
    pub output: Vec<AttributeRef>,
    /// Whether the relation is read as an unbounded stream.
    pub is_streaming: bool,
}

impl FileScanOp {
    /// Create a batch scan over `location`.
    pub fn new(location: impl Into<String>, data_schema: Schema, partition_schema: Schema) -> Self {
        let partition_names = partition_schema.lowercase_index();
        let data_only = Schema::with_columns(
            data_schema
                .columns
                .iter()
                .filter(|c| !partition_names.contains_key(&c.name.to_lowercase()))
                .cloned()
                .collect(),
        );
        let output = attributes_of(&data_only.merge(&partition_schema));

        Self {
            location: location.into(),
            data_schema,
            partition_schema,
            output,
            is_streaming: false,
        }
    }

    /// Mark the scan as a streaming source.
    #[must_use]
    pub fn with_streaming(mut self, is_streaming: bool) -> Self {
        self.is_streaming = is_streaming;
        self
    }

    /// Replace the produced columns.
    #[must_use]
    pub fn with_output(mut self, output: Vec<AttributeRef>) -> Self {
        self.output = output;
        self
    }
}

impl std::fmt::Display for FileScanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FileScan({}, partitions=[{}], output={}{})",
            self.location,
            self.partition_schema.column_names().join(", "),
            format_attrs(&self.output),
            if self.is_streaming { ", streaming" } else { "" }
        )
    }
}

/// Scan of a catalog table whose partitions are recorded in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogScanOp {
    /// Table definition.
    pub table: CatalogTable,
    /// Produced columns.
    pub output: Vec<AttributeRef>,
}

impl CatalogScanOp {
    /// Scan `table`, allocating one attribute per schema column.
    pub fn new(table: CatalogTable) -> Self {
        let output = attributes_of(&table.schema);
        Self { table, output }
    }
}

impl std::fmt::Display for CatalogScanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CatalogScan({}, partitions=[{}], output={})",
            self.table.identifier,
            self.table.partition_column_names.join(", "),
            format_attrs(&self.output)
        )
    }
}

/// Relation whose rows are held in the plan itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRelationOp {
    /// Produced columns.
    pub output: Vec<AttributeRef>,
    /// Rows, each ordered like `output`.
    pub rows: Vec<Vec<Value>>,
    /// Whether the relation stands in for a streaming source.
    pub is_streaming: bool,
}

impl LocalRelationOp {
    /// Create a batch relation.
    pub fn new(output: Vec<AttributeRef>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            output,
            rows,
            is_streaming: false,
        }
    }

    /// Mark the relation as a streaming source.
    #[must_use]
    pub fn with_streaming(mut self, is_streaming: bool) -> Self {
        self.is_streaming = is_streaming;
        self
    }
}

impl std::fmt::Display for LocalRelationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LocalRelation({}, rows={}{})",
            format_attrs(&self.output),
            self.rows.len(),
            if self.is_streaming { ", streaming" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{ColumnInfo, DataType};

    #[test]
    fn test_file_scan_output_prefers_partition_columns() {
        let scan = FileScanOp::new(
            "/data/events",
            Schema::with_columns(vec![
                ColumnInfo::new("payload", DataType::String),
                ColumnInfo::new("DAY", DataType::String),
            ]),
            Schema::with_columns(vec![ColumnInfo::new("day", DataType::Date)]),
        );

        let names: Vec<_> = scan.output.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["payload", "day"]);
        assert_eq!(scan.output[1].data_type, DataType::Date);
    }

    #[test]
    fn test_catalog_scan_allocates_fresh_attributes() {
        let table = CatalogTable::new(
            TableIdentifier::new("t"),
            Schema::with_columns(vec![ColumnInfo::new("p", DataType::Int32)]),
            vec!["p".to_string()],
        );
        let a = CatalogScanOp::new(table.clone());
        let b = CatalogScanOp::new(table);

        assert!(!a.output[0].semantic_eq(&b.output[0]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_local_relation_display() {
        let p = AttributeRef::new("p", DataType::Int32);
        let local = LocalRelationOp::new(vec![p], vec![vec![Value::Int32(1)]]).with_streaming(true);
        let rendered = local.to_string();
        assert!(rendered.starts_with("LocalRelation([p#"));
        assert!(rendered.ends_with("rows=1, streaming)"));
    }
}
