//! Answers aggregates over partition columns from partition metadata.

use std::cell::Cell;
use std::sync::Arc;

use log::{debug, trace};

use common_config::StrataConfig;
use common_error::StrataResult;
use strata_catalog::PartitionCatalog;
use strata_core::TimeZone;
use strata_logical::{AggregateOp, LogicalOp, LogicalPlan};

use super::partitioned_relation::{MatchResult, match_partitioned_relation};
use super::rule::{OptimizationRule, Transformed};
use super::scan_replacer::ScanReplacer;

/// Rewrites `Aggregate` nodes that only need partition values.
///
/// An aggregate qualifies when its child is a partitioned relation reached
/// through deterministic projections and partition-column filters, every
/// attribute it reads is derived from partition columns, and every
/// aggregate call ignores duplicate rows (`DISTINCT`, `max`, `min`, `first`,
/// `last`). The relation is then replaced by a local relation holding one
/// row per partition:
///
/// ```text
/// SELECT col FROM tbl GROUP BY col
/// SELECT col1, count(DISTINCT col2) FROM tbl GROUP BY col1
/// SELECT max(col) FROM tbl WHERE col > 1
/// ```
///
/// A partition that exists but holds no rows still contributes its values,
/// so the rule is off unless the session enables it.
pub struct MetadataOnlyQuery {
    enabled: bool,
    session_time_zone: TimeZone,
    catalog: Arc<dyn PartitionCatalog>,
}

impl MetadataOnlyQuery {
    /// Create the rule from session configuration.
    ///
    /// The session time zone is only validated when the rule is enabled.
    pub fn new(config: &StrataConfig, catalog: Arc<dyn PartitionCatalog>) -> StrataResult<Self> {
        let enabled = config.optimizer.metadata_only_query;
        let session_time_zone = if enabled {
            TimeZone::parse(&config.session.time_zone)?
        } else {
            TimeZone::utc()
        };
        Ok(Self {
            enabled,
            session_time_zone,
            catalog,
        })
    }

    /// Whether the rule rewrites anything at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn rewrite_aggregate(
        &self,
        replacer: &ScanReplacer<'_>,
        input: LogicalOp,
        aggregate: AggregateOp,
    ) -> StrataResult<(LogicalOp, bool)> {
        let matched = match match_partitioned_relation(&input)? {
            Some(matched) if is_eligible(&aggregate, &matched) => matched,
            _ => return Ok((LogicalOp::aggregate(input, aggregate), false)),
        };

        let input = replacer.replace(&matched.relation, input, &matched.filters)?;
        debug!(
            "Answering {} from partition metadata of {}",
            aggregate, matched.relation
        );
        Ok((LogicalOp::aggregate(input, aggregate), true))
    }
}

/// Whether `aggregate` can be computed over distinct partition values.
fn is_eligible(aggregate: &AggregateOp, child: &MatchResult) -> bool {
    if !aggregate.references().is_subset(&child.reachable_attrs) {
        trace!(
            "{aggregate} reads attributes not derived from partition columns, keeping the scan"
        );
        return false;
    }

    match aggregate
        .aggregate_calls()
        .into_iter()
        .find(|call| !call.is_duplicate_insensitive())
    {
        Some(call) => {
            trace!("{call} is sensitive to duplicate rows, keeping the scan");
            false
        }
        None => true,
    }
}

impl OptimizationRule for MetadataOnlyQuery {
    fn name(&self) -> &'static str {
        "MetadataOnlyQuery"
    }

    fn description(&self) -> &'static str {
        "Answer duplicate-insensitive aggregates over partition columns from partition metadata"
    }

    fn apply(&self, plan: LogicalPlan) -> StrataResult<Transformed> {
        if !self.enabled {
            return Ok(Transformed::no(plan));
        }

        let replacer = ScanReplacer::new(self.catalog.as_ref(), self.session_time_zone);
        let changed = Cell::new(false);
        let plan = plan.try_transform(|op| -> StrataResult<LogicalOp> {
            match op {
                LogicalOp::Aggregate { input, aggregate } => {
                    let (op, rewritten) = self.rewrite_aggregate(&replacer, *input, aggregate)?;
                    if rewritten {
                        changed.set(true);
                    }
                    Ok(op)
                }
                other => Ok(other),
            }
        })?;

        Ok(Transformed {
            plan,
            changed: changed.get(),
        })
    }
}
