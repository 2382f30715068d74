//! Schema system for Strata.
//!
//! `Schema` is an ordered list of `ColumnInfo`s describing a relation or a
//! table's partition columns.

mod schema;

pub use schema::{ColumnInfo, Schema};
