//! Partition metadata services for Strata.
//!
//! - [`PartitionCatalog`]: the listing capability the optimizer consumes
//! - [`MemoryCatalog`]: an in-memory implementation
//! - [`PartitionEvaluator`]: evaluates partition predicates against a
//!   partition's values

mod catalog;
mod eval;
mod memory;

pub use catalog::PartitionCatalog;
pub use eval::{PartitionEvaluator, PartitionValues};
pub use memory::{ListingStats, MemoryCatalog};
