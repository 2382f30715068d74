//! Core data model for Strata.
//!
//! This crate provides the types shared by the planner and the catalog:
//! - `Value`, `DataType` and `TimeZone` for the type system
//! - `Schema` and `ColumnInfo` for relation schemas
//! - `CatalogTable`, `PartitionSpec` and friends for partition metadata

pub mod catalog;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use catalog::{
    CatalogPartition, CatalogTable, PartitionDirectory, PartitionSpec, StorageFormat,
    TableIdentifier,
};
pub use schema::{ColumnInfo, Schema};
pub use types::{DataType, TimeZone, Value};
