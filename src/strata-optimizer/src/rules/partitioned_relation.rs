//! Recognizes a partitioned relation beneath projections and filters.

use common_error::StrataResult;
use strata_logical::{
    AttributeRef, AttributeResolver, AttributeSet, LogicalExpr, LogicalOp,
    split_conjunctive_predicates,
};

/// A partitioned relation reached from some plan node.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Partition attributes of the relation.
    pub partition_attrs: AttributeSet,
    /// Attributes the matched node exposes that are backed by partition
    /// columns, possibly under new names or computed from them.
    pub reachable_attrs: AttributeSet,
    /// Conjuncts of every filter between the node and the relation, outer
    /// filters first.
    pub filters: Vec<LogicalExpr>,
    /// The relation leaf.
    pub relation: LogicalOp,
}

impl MatchResult {
    fn leaf(relation: &LogicalOp, partition_attrs: Vec<AttributeRef>) -> Self {
        let partition_attrs: AttributeSet = partition_attrs.into_iter().collect();
        Self {
            reachable_attrs: partition_attrs.clone(),
            partition_attrs,
            filters: Vec::new(),
            relation: relation.clone(),
        }
    }
}

/// Partition attributes of a relation leaf, in partition-column order.
///
/// `None` when `relation` is not a partitioned file or catalog relation.
/// Names are matched case-insensitively against the relation output; a
/// partition column the output lacks is an error.
pub(crate) fn partition_attributes(
    relation: &LogicalOp,
) -> StrataResult<Option<Vec<AttributeRef>>> {
    match relation {
        LogicalOp::FileScan(scan) if !scan.partition_schema.is_empty() => {
            let resolver = AttributeResolver::new(&scan.output);
            resolver
                .resolve_all(&scan.partition_schema.column_names())
                .map(Some)
        }
        LogicalOp::CatalogScan(scan) if !scan.table.partition_column_names.is_empty() => {
            let resolver = AttributeResolver::new(&scan.output);
            resolver
                .resolve_all(&scan.table.partition_column_names)
                .map(Some)
        }
        _ => Ok(None),
    }
}

/// Match `plan` against
/// `(Project | Filter)* -> (FileScan | CatalogScan)` where every project and
/// filter is deterministic, projections only read reachable attributes and
/// filters only read partition attributes.
pub fn match_partitioned_relation(plan: &LogicalOp) -> StrataResult<Option<MatchResult>> {
    match plan {
        LogicalOp::FileScan(_) | LogicalOp::CatalogScan(_) => {
            Ok(partition_attributes(plan)?.map(|attrs| MatchResult::leaf(plan, attrs)))
        }
        LogicalOp::Project { input, project } => {
            if !project.expressions.iter().all(LogicalExpr::is_deterministic) {
                return Ok(None);
            }
            let Some(child) = match_partitioned_relation(input)? else {
                return Ok(None);
            };
            if !plan.references().is_subset(&child.reachable_attrs) {
                return Ok(None);
            }
            Ok(Some(MatchResult {
                reachable_attrs: plan.output_set(),
                ..child
            }))
        }
        LogicalOp::Filter { input, filter } => {
            if !filter.predicate.is_deterministic() {
                return Ok(None);
            }
            let Some(child) = match_partitioned_relation(input)? else {
                return Ok(None);
            };
            if !filter.predicate.references().is_subset(&child.partition_attrs) {
                return Ok(None);
            }
            let mut filters = split_conjunctive_predicates(&filter.predicate);
            filters.extend(child.filters);
            Ok(Some(MatchResult { filters, ..child }))
        }
        _ => Ok(None),
    }
}
