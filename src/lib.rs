//! Strata - partition-aware logical planning.
//!
//! Strata plans aggregate queries over partitioned tables. When the session
//! enables `strata.optimizer.metadataOnly`, aggregates that only need the
//! distinct values of partition columns are answered from the partition
//! catalog instead of the table's files.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use strata::catalog::MemoryCatalog;
//! use strata::config::{METADATA_ONLY_QUERY_KEY, StrataConfig};
//! use strata::core::{
//!     CatalogPartition, CatalogTable, ColumnInfo, DataType, PartitionSpec, Schema, TableIdentifier,
//! };
//! use strata::logical::{AggregateOp, CatalogScanOp, LogicalOp, PlanBuilder};
//!
//! let table = CatalogTable::new(
//!     TableIdentifier::new("logs"),
//!     Schema::with_columns(vec![
//!         ColumnInfo::new("line", DataType::String),
//!         ColumnInfo::new("day", DataType::Date),
//!     ]),
//!     vec!["day".to_string()],
//! );
//! let catalog = MemoryCatalog::new();
//! catalog.add_partition(
//!     &table.identifier,
//!     CatalogPartition::new(PartitionSpec::new().with("day", "2024-06-01")),
//! );
//!
//! let builder = PlanBuilder::catalog_scan(CatalogScanOp::new(table));
//! let day = builder.attr("day")?;
//! let plan = builder.aggregate(AggregateOp::group_by([&day])).build();
//!
//! let config = StrataConfig::default().with(METADATA_ONLY_QUERY_KEY, "true")?;
//! let optimized = strata::optimize(plan, &config, Arc::new(catalog))?;
//! assert!(optimized.contains_op(|op| matches!(op, LogicalOp::LocalRelation(_))));
//! # Ok::<(), strata::error::StrataError>(())
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export member crates
pub use common_config as config;
pub use common_error as error;
pub use strata_catalog as catalog;
pub use strata_core as core;
pub use strata_logical as logical;
pub use strata_optimizer as optimizer;

pub use strata_optimizer::optimize;

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
