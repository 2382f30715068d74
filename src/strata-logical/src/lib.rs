//! Logical planning layer for Strata.
//!
//! `strata-logical` provides the logical IR the optimizer rewrites:
//!
//! - **Attributes**: column references with a stable identity (`ExprId`)
//! - **Expression System**: deterministic expressions for predicates,
//!   projections and aggregations
//! - **Logical Operators**: scans of partitioned relations, Filter, Project,
//!   Aggregate and friends
//! - **Logical Plan**: the tree wrapper with traversal, rewrite and explain
//!
//! # Example
//!
//! ```rust
//! use strata_core::{CatalogTable, ColumnInfo, DataType, Schema, TableIdentifier};
//! use strata_logical::{AggregateOp, CatalogScanOp, PlanBuilder};
//!
//! let table = CatalogTable::new(
//!     TableIdentifier::new("events"),
//!     Schema::with_columns(vec![
//!         ColumnInfo::new("payload", DataType::String),
//!         ColumnInfo::new("day", DataType::Date),
//!     ]),
//!     vec!["day".to_string()],
//! );
//!
//! let builder = PlanBuilder::catalog_scan(CatalogScanOp::new(table));
//! let day = builder.attr("day").unwrap();
//! let plan = builder.aggregate(AggregateOp::group_by([&day])).build();
//!
//! println!("{}", plan.explain());
//! ```

mod attribute;
pub mod expr;
pub mod ops;
mod plan;

pub use attribute::{AttributeRef, AttributeResolver, AttributeSet, ExprId};
pub use plan::{LogicalPlan, PlanBuilder};

// Re-export operator types at crate root for convenience
pub use ops::{
    AggregateOp, CatalogScanOp, FileScanOp, FilterOp, LimitOp, LocalRelationOp, LogicalOp,
    ProjectOp, ScanOp, SortKey, SortOp, UnionOp,
};

// Re-export expression types at crate root for convenience
pub use expr::{
    AggCategory, AggExpr, AggFunc, BinaryOp, Determinism, FuncExpr, LogicalExpr, UnaryOp, col,
    conjunction, lit, split_conjunctive_predicates,
};
