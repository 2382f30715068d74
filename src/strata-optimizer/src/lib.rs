//! Query optimizer for Strata logical plans.
//!
//! Rules implement [`OptimizationRule`] and are driven to a fixpoint by the
//! [`Optimizer`]. The one rule shipped here, [`MetadataOnlyQuery`], answers
//! aggregates over partition columns from partition metadata.

mod rules;

pub use rules::{
    MatchResult, MetadataOnlyQuery, OptimizationRule, OptimizedPlan, Optimizer, RuleTrace,
    ScanReplacer, Transformed, match_partitioned_relation,
};

use std::sync::Arc;

use common_config::StrataConfig;
use common_error::StrataResult;
use strata_catalog::PartitionCatalog;
use strata_logical::LogicalPlan;

/// Optimize a logical plan with the rules enabled by `config`.
pub fn optimize(
    plan: LogicalPlan,
    config: &StrataConfig,
    catalog: Arc<dyn PartitionCatalog>,
) -> StrataResult<LogicalPlan> {
    let optimizer = Optimizer::from_config(config, catalog)?;
    Ok(optimizer.optimize(plan)?.plan)
}
