//! Optimization rules for Strata query plans.
//!
//! - **Metadata-only query**: replace the scan under a duplicate-insensitive
//!   aggregate over partition columns with the partition values themselves

mod metadata_only;
mod optimizer;
mod partitioned_relation;
mod rule;
mod scan_replacer;

pub use metadata_only::MetadataOnlyQuery;
pub use optimizer::Optimizer;
pub use partitioned_relation::{MatchResult, match_partitioned_relation};
pub use rule::{OptimizationRule, OptimizedPlan, RuleTrace, Transformed};
pub use scan_replacer::ScanReplacer;
