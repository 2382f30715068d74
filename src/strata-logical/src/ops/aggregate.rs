//! Aggregate operator for grouping and aggregation.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeRef, AttributeSet};
use crate::expr::{AggExpr, LogicalExpr};

/// Aggregate operator - grouping and aggregation.
///
/// `aggregates` is the full output list: grouping columns that are carried
/// through, and expressions containing aggregate calls. An entry may combine
/// several calls, e.g. `max(a) - min(a)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOp {
    /// Grouping key expressions.
    pub group_by: Vec<LogicalExpr>,
    /// Output expressions.
    pub aggregates: Vec<LogicalExpr>,
}

impl AggregateOp {
    /// Create a new aggregate operation, naming unnamed output expressions.
    pub fn new(group_by: Vec<LogicalExpr>, aggregates: Vec<LogicalExpr>) -> Self {
        Self {
            group_by,
            aggregates: aggregates
                .into_iter()
                .map(LogicalExpr::into_named)
                .collect(),
        }
    }

    /// Group by the given attributes and output them.
    pub fn group_by<'a>(keys: impl IntoIterator<Item = &'a AttributeRef>) -> Self {
        let group_by: Vec<LogicalExpr> = keys.into_iter().map(LogicalExpr::column).collect();
        Self {
            aggregates: group_by.clone(),
            group_by,
        }
    }

    /// Add an output expression.
    #[must_use]
    pub fn with_agg(mut self, expr: impl Into<LogicalExpr>) -> Self {
        self.aggregates.push(expr.into().into_named());
        self
    }

    /// Attributes read by the grouping keys and output expressions.
    pub fn references(&self) -> AttributeSet {
        let mut refs = AttributeSet::new();
        for expr in self.group_by.iter().chain(&self.aggregates) {
            refs.extend(expr.references().iter().cloned());
        }
        refs
    }

    /// Every aggregate call in the output expressions.
    pub fn aggregate_calls(&self) -> Vec<&AggExpr> {
        self.aggregates
            .iter()
            .flat_map(LogicalExpr::collect_aggregates)
            .collect()
    }

    /// Attributes produced by the aggregate.
    pub fn output(&self) -> Vec<AttributeRef> {
        self.aggregates
            .iter()
            .filter_map(LogicalExpr::to_attribute)
            .collect()
    }
}

impl std::fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.group_by.iter().map(ToString::to_string).collect();
        let aggs: Vec<String> = self.aggregates.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Aggregate(keys=[{}], output=[{}])",
            keys.join(", "),
            aggs.join(", ")
        )
    }
}
