//! Logical plan structure.
//!
//! A `LogicalPlan` wraps the root operator of a tree and offers whole-plan
//! traversals, rewrites and `explain` output.

use serde::{Deserialize, Serialize};

use common_error::StrataResult;
use strata_core::{ColumnInfo, Schema};

use crate::attribute::AttributeRef;
use crate::ops::{
    AggregateOp, CatalogScanOp, FileScanOp, FilterOp, LimitOp, LogicalOp, ProjectOp, ScanOp,
    SortOp, UnionOp,
};

/// A logical plan representing a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPlan {
    /// The root operator of the plan.
    pub root: LogicalOp,
}

impl LogicalPlan {
    /// Create a new logical plan with the given root operator.
    pub const fn new(root: LogicalOp) -> Self {
        Self { root }
    }

    /// Get a reference to the root operator.
    pub const fn root(&self) -> &LogicalOp {
        &self.root
    }

    /// Take the root operator.
    pub fn into_root(self) -> LogicalOp {
        self.root
    }

    /// Attributes produced by the plan.
    pub fn output(&self) -> Vec<AttributeRef> {
        self.root.output()
    }

    /// Output schema derived from the root's attributes.
    pub fn schema(&self) -> Schema {
        Schema::with_columns(
            self.output()
                .into_iter()
                .map(|a| ColumnInfo::new(a.name, a.data_type).with_nullable(a.nullable))
                .collect(),
        )
    }

    /// Generate a tree-formatted explanation of the plan.
    pub fn explain(&self) -> String {
        let mut output = String::new();
        output.push_str("Logical Plan:\n");
        output.push_str(&self.root.explain(1));
        output
    }

    /// Generate an explanation followed by the output schema.
    pub fn explain_verbose(&self) -> String {
        let mut output = self.explain();
        output.push_str("\nOutput:\n");
        for attr in self.output() {
            output.push_str(&format!(
                "  - {attr}: {} {}\n",
                attr.data_type,
                if attr.nullable { "(nullable)" } else { "" }
            ));
        }
        output
    }

    /// Count the number of operators in the plan.
    pub fn operator_count(&self) -> usize {
        fn count(op: &LogicalOp) -> usize {
            1 + op.inputs().iter().map(|i| count(i)).sum::<usize>()
        }
        count(&self.root)
    }

    /// Get the maximum depth of the plan tree.
    pub fn depth(&self) -> usize {
        fn max_depth(op: &LogicalOp) -> usize {
            1 + op.inputs().iter().map(|i| max_depth(i)).max().unwrap_or(0)
        }
        max_depth(&self.root)
    }

    /// Check if the plan contains a specific operator type.
    pub fn contains_op<F>(&self, predicate: F) -> bool
    where
        F: Fn(&LogicalOp) -> bool,
    {
        fn check<F>(op: &LogicalOp, predicate: &F) -> bool
        where
            F: Fn(&LogicalOp) -> bool,
        {
            predicate(op) || op.inputs().iter().any(|i| check(i, predicate))
        }
        check(&self.root, &predicate)
    }

    /// Collect references to every operator matching `predicate`, pre-order.
    pub fn find_ops<F>(&self, predicate: F) -> Vec<&LogicalOp>
    where
        F: Fn(&LogicalOp) -> bool,
    {
        fn walk<'a, F>(op: &'a LogicalOp, predicate: &F, out: &mut Vec<&'a LogicalOp>)
        where
            F: Fn(&LogicalOp) -> bool,
        {
            if predicate(op) {
                out.push(op);
            }
            for input in op.inputs() {
                walk(input, predicate, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &predicate, &mut out);
        out
    }

    /// Transform the plan by applying a function to each operator (bottom-up).
    #[must_use]
    pub fn transform<F>(self, f: F) -> Self
    where
        F: Fn(LogicalOp) -> LogicalOp,
    {
        Self::new(self.root.transform_up(&f))
    }

    /// Transform the plan by applying a fallible function to each operator
    /// (bottom-up).
    pub fn try_transform<F, E>(self, f: F) -> Result<Self, E>
    where
        F: Fn(LogicalOp) -> Result<LogicalOp, E>,
    {
        Ok(Self::new(self.root.try_transform_up(&f)?))
    }
}

impl std::fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root.explain(0))
    }
}

impl From<LogicalOp> for LogicalPlan {
    fn from(op: LogicalOp) -> Self {
        Self::new(op)
    }
}

/// Builder for constructing logical plans fluently.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    op: LogicalOp,
}

impl PlanBuilder {
    /// Start building from any operator.
    pub const fn from_op(op: LogicalOp) -> Self {
        Self { op }
    }

    /// Start building from a table scan.
    pub fn scan(scan: ScanOp) -> Self {
        Self::from_op(LogicalOp::scan(scan))
    }

    /// Start building from a file-based relation scan.
    pub fn file_scan(scan: FileScanOp) -> Self {
        Self::from_op(LogicalOp::file_scan(scan))
    }

    /// Start building from a catalog table scan.
    pub fn catalog_scan(scan: CatalogScanOp) -> Self {
        Self::from_op(LogicalOp::catalog_scan(scan))
    }

    /// Resolve a column of the current output by name, ignoring case.
    pub fn attr(&self, name: &str) -> StrataResult<AttributeRef> {
        self.op.output_attr(name)
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(self, filter: FilterOp) -> Self {
        Self::from_op(LogicalOp::filter(self.op, filter))
    }

    /// Add a project.
    #[must_use]
    pub fn project(self, project: ProjectOp) -> Self {
        Self::from_op(LogicalOp::project(self.op, project))
    }

    /// Add an aggregate.
    #[must_use]
    pub fn aggregate(self, aggregate: AggregateOp) -> Self {
        Self::from_op(LogicalOp::aggregate(self.op, aggregate))
    }

    /// Add a limit.
    #[must_use]
    pub fn limit(self, limit: LimitOp) -> Self {
        Self::from_op(LogicalOp::limit(self.op, limit))
    }

    /// Add a sort.
    #[must_use]
    pub fn sort(self, sort: SortOp) -> Self {
        Self::from_op(LogicalOp::sort(self.op, sort))
    }

    /// Union with another plan.
    #[must_use]
    pub fn union(self, other: LogicalOp, union: UnionOp) -> Self {
        Self::from_op(LogicalOp::union(self.op, other, union))
    }

    /// The operator built so far.
    pub fn op(&self) -> &LogicalOp {
        &self.op
    }

    /// Build the final plan.
    pub fn build(self) -> LogicalPlan {
        LogicalPlan::new(self.op)
    }
}
