//! Logical operators for query plans.
//!
//! A plan is a tree of [`LogicalOp`] values. Every operator exposes its
//! output attributes, the attributes its own expressions reference, and
//! whether those expressions are deterministic. Trees are never edited in
//! place: rewrites consume an operator and build a new one.

mod aggregate;
mod filter;
mod limit;
mod project;
mod scan;
mod sort;
mod union;

pub use aggregate::AggregateOp;
pub use filter::FilterOp;
pub use limit::LimitOp;
pub use project::ProjectOp;
pub use scan::{CatalogScanOp, FileScanOp, LocalRelationOp, ScanOp};
pub use sort::{SortKey, SortOp};
pub use union::UnionOp;

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use common_error::StrataResult;

use crate::attribute::{AttributeRef, AttributeResolver, AttributeSet};
use crate::expr::LogicalExpr;

/// Logical operator in a query plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalOp {
    /// Scan of an unpartitioned table.
    Scan(ScanOp),

    /// Scan of a file-based partitioned relation.
    FileScan(FileScanOp),

    /// Scan of a catalog table with catalog-managed partitions.
    CatalogScan(CatalogScanOp),

    /// Rows held in the plan.
    LocalRelation(LocalRelationOp),

    /// Filter rows based on a predicate.
    Filter {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Filter predicate.
        filter: FilterOp,
    },

    /// Project columns.
    Project {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Projected expressions.
        project: ProjectOp,
    },

    /// Group and aggregate rows.
    Aggregate {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Grouping keys and outputs.
        aggregate: AggregateOp,
    },

    /// Limit number of rows.
    Limit {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Row limit.
        limit: LimitOp,
    },

    /// Order rows.
    Sort {
        /// Input operator.
        input: Box<LogicalOp>,
        /// Sort keys.
        sort: SortOp,
    },

    /// Multiset union of two inputs.
    Union {
        /// Left input; provides the output attributes.
        left: Box<LogicalOp>,
        /// Right input.
        right: Box<LogicalOp>,
        /// Union mode.
        union: UnionOp,
    },
}

impl LogicalOp {
    // ========== Constructors ==========

    /// Create a table scan.
    pub fn scan(scan: ScanOp) -> Self {
        Self::Scan(scan)
    }

    /// Create a file-based relation scan.
    pub fn file_scan(scan: FileScanOp) -> Self {
        Self::FileScan(scan)
    }

    /// Create a catalog table scan.
    pub fn catalog_scan(scan: CatalogScanOp) -> Self {
        Self::CatalogScan(scan)
    }

    /// Create an in-plan relation.
    pub fn local_relation(local: LocalRelationOp) -> Self {
        Self::LocalRelation(local)
    }

    /// Create a filter over `input`.
    pub fn filter(input: Self, filter: FilterOp) -> Self {
        Self::Filter {
            input: Box::new(input),
            filter,
        }
    }

    /// Create a projection over `input`.
    pub fn project(input: Self, project: ProjectOp) -> Self {
        Self::Project {
            input: Box::new(input),
            project,
        }
    }

    /// Create an aggregation over `input`.
    pub fn aggregate(input: Self, aggregate: AggregateOp) -> Self {
        Self::Aggregate {
            input: Box::new(input),
            aggregate,
        }
    }

    /// Create a limit over `input`.
    pub fn limit(input: Self, limit: LimitOp) -> Self {
        Self::Limit {
            input: Box::new(input),
            limit,
        }
    }

    /// Create a sort over `input`.
    pub fn sort(input: Self, sort: SortOp) -> Self {
        Self::Sort {
            input: Box::new(input),
            sort,
        }
    }

    /// Create a union of two inputs.
    pub fn union(left: Self, right: Self, union: UnionOp) -> Self {
        Self::Union {
            left: Box::new(left),
            right: Box::new(right),
            union,
        }
    }

    // ========== Structure ==========

    /// Get the input operators.
    pub fn inputs(&self) -> Vec<&Self> {
        match self {
            Self::Scan(_) | Self::FileScan(_) | Self::CatalogScan(_) | Self::LocalRelation(_) => {
                vec![]
            }
            Self::Filter { input, .. }
            | Self::Project { input, .. }
            | Self::Aggregate { input, .. }
            | Self::Limit { input, .. }
            | Self::Sort { input, .. } => vec![input.as_ref()],
            Self::Union { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Number of input operators.
    pub fn input_count(&self) -> usize {
        self.inputs().len()
    }

    /// Whether this operator has no inputs.
    pub fn is_leaf(&self) -> bool {
        self.input_count() == 0
    }

    /// Get the name of this operator.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "Scan",
            Self::FileScan(_) => "FileScan",
            Self::CatalogScan(_) => "CatalogScan",
            Self::LocalRelation(_) => "LocalRelation",
            Self::Filter { .. } => "Filter",
            Self::Project { .. } => "Project",
            Self::Aggregate { .. } => "Aggregate",
            Self::Limit { .. } => "Limit",
            Self::Sort { .. } => "Sort",
            Self::Union { .. } => "Union",
        }
    }

    /// Rebuild this operator with each input replaced by `f(input)`.
    pub fn try_map_children<F, E>(self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(Self) -> Result<Self, E>,
    {
        Ok(match self {
            leaf @ (Self::Scan(_)
            | Self::FileScan(_)
            | Self::CatalogScan(_)
            | Self::LocalRelation(_)) => leaf,
            Self::Filter { input, filter } => Self::Filter {
                input: Box::new(f(*input)?),
                filter,
            },
            Self::Project { input, project } => Self::Project {
                input: Box::new(f(*input)?),
                project,
            },
            Self::Aggregate { input, aggregate } => Self::Aggregate {
                input: Box::new(f(*input)?),
                aggregate,
            },
            Self::Limit { input, limit } => Self::Limit {
                input: Box::new(f(*input)?),
                limit,
            },
            Self::Sort { input, sort } => Self::Sort {
                input: Box::new(f(*input)?),
                sort,
            },
            Self::Union { left, right, union } => Self::Union {
                left: Box::new(f(*left)?),
                right: Box::new(f(*right)?),
                union,
            },
        })
    }

    /// Infallible variant of [`LogicalOp::try_map_children`].
    #[must_use]
    pub fn map_children<F>(self, mut f: F) -> Self
    where
        F: FnMut(Self) -> Self,
    {
        match self.try_map_children(|child| Ok::<_, Infallible>(f(child))) {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }

    /// Rewrite the subtree bottom-up with a fallible function.
    pub fn try_transform_up<F, E>(self, f: &F) -> Result<Self, E>
    where
        F: Fn(Self) -> Result<Self, E>,
    {
        let rebuilt = self.try_map_children(|child| child.try_transform_up(f))?;
        f(rebuilt)
    }

    /// Rewrite the subtree bottom-up.
    #[must_use]
    pub fn transform_up<F>(self, f: &F) -> Self
    where
        F: Fn(Self) -> Self,
    {
        let rebuilt = self.map_children(|child| child.transform_up(f));
        f(rebuilt)
    }

    // ========== Attributes and expressions ==========

    /// Attributes produced by this operator, in column order.
    pub fn output(&self) -> Vec<AttributeRef> {
        match self {
            Self::Scan(scan) => scan.output.clone(),
            Self::FileScan(scan) => scan.output.clone(),
            Self::CatalogScan(scan) => scan.output.clone(),
            Self::LocalRelation(local) => local.output.clone(),
            Self::Filter { input, .. } | Self::Limit { input, .. } | Self::Sort { input, .. } => {
                input.output()
            }
            Self::Project { project, .. } => project.output(),
            Self::Aggregate { aggregate, .. } => aggregate.output(),
            Self::Union { left, .. } => left.output(),
        }
    }

    /// Attributes produced by this operator, as a set.
    pub fn output_set(&self) -> AttributeSet {
        self.output().into_iter().collect()
    }

    /// Resolve an output column by name, ignoring case.
    pub fn output_attr(&self, name: &str) -> StrataResult<AttributeRef> {
        AttributeResolver::new(&self.output()).resolve(name)
    }

    /// Expressions owned by this operator (not its inputs).
    pub fn expressions(&self) -> Vec<&LogicalExpr> {
        match self {
            Self::Filter { filter, .. } => vec![&filter.predicate],
            Self::Project { project, .. } => project.expressions.iter().collect(),
            Self::Aggregate { aggregate, .. } => aggregate
                .group_by
                .iter()
                .chain(&aggregate.aggregates)
                .collect(),
            Self::Sort { sort, .. } => sort.keys.iter().map(|k| &k.expr).collect(),
            _ => vec![],
        }
    }

    /// Attributes referenced by this operator's own expressions.
    pub fn references(&self) -> AttributeSet {
        let mut refs = AttributeSet::new();
        for expr in self.expressions() {
            refs.extend(expr.references().iter().cloned());
        }
        refs
    }

    /// Whether every expression owned by this operator is deterministic.
    pub fn is_deterministic(&self) -> bool {
        self.expressions().iter().all(|e| e.is_deterministic())
    }

    // ========== Explain ==========

    /// Explain this operator and its inputs as an indented tree.
    pub fn explain(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut result = format!("{prefix}{self}");

        for input in self.inputs() {
            result.push('\n');
            result.push_str(&input.explain(indent + 1));
        }

        result
    }
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan(scan) => write!(f, "{scan}"),
            Self::FileScan(scan) => write!(f, "{scan}"),
            Self::CatalogScan(scan) => write!(f, "{scan}"),
            Self::LocalRelation(local) => write!(f, "{local}"),
            Self::Filter { filter, .. } => write!(f, "Filter({})", filter.predicate),
            Self::Project { project, .. } => write!(f, "{project}"),
            Self::Aggregate { aggregate, .. } => write!(f, "{aggregate}"),
            Self::Limit { limit, .. } => write!(f, "{limit}"),
            Self::Sort { sort, .. } => write!(f, "{sort}"),
            Self::Union { union, .. } => write!(f, "{union}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{AggExpr, col, lit};
    use strata_core::{ColumnInfo, DataType, Schema, TableIdentifier};

    fn table_scan() -> LogicalOp {
        LogicalOp::scan(ScanOp::new(
            TableIdentifier::new("t"),
            &Schema::with_columns(vec![
                ColumnInfo::new("a", DataType::Int64),
                ColumnInfo::new("b", DataType::String),
            ]),
        ))
    }

    #[test]
    fn test_filter_passes_output_through() {
        let scan = table_scan();
        let a = scan.output_attr("A").unwrap();
        let filter = LogicalOp::filter(scan.clone(), FilterOp::new(col(&a).gt(lit(0i64))));

        assert_eq!(filter.output(), scan.output());
        assert_eq!(filter.references().len(), 1);
        assert!(filter.references().contains(&a));
    }

    #[test]
    fn test_aggregate_references_include_keys_and_arguments() {
        let scan = table_scan();
        let a = scan.output_attr("a").unwrap();
        let b = scan.output_attr("b").unwrap();
        let agg = LogicalOp::aggregate(
            scan,
            AggregateOp::group_by([&a]).with_agg(AggExpr::count(col(&b)).with_distinct(true)),
        );

        let refs = agg.references();
        assert!(refs.contains(&a) && refs.contains(&b));
        assert_eq!(agg.output().len(), 2);
    }

    #[test]
    fn test_determinism_of_owned_expressions() {
        let scan = table_scan();
        let a = scan.output_attr("a").unwrap();
        let random = LogicalOp::filter(
            scan.clone(),
            FilterOp::new(col(&a).lt(LogicalExpr::rand())),
        );

        assert!(scan.is_deterministic());
        assert!(!random.is_deterministic());
    }

    #[test]
    fn test_transform_up_visits_children_first() {
        let scan = table_scan();
        let plan = LogicalOp::limit(
            LogicalOp::union(scan.clone(), scan, UnionOp::all()),
            LimitOp::new(5),
        );

        let order = std::cell::RefCell::new(Vec::new());
        let _ = plan.transform_up(&|op| {
            order.borrow_mut().push(op.name());
            op
        });

        assert_eq!(order.into_inner(), vec!["Scan", "Scan", "Union", "Limit"]);
    }

    #[test]
    fn test_try_transform_up_propagates_errors() {
        let plan = LogicalOp::limit(table_scan(), LimitOp::new(1));
        let result: Result<LogicalOp, &str> = plan.try_transform_up(&|op| match op {
            LogicalOp::Scan(_) => Err("boom"),
            other => Ok(other),
        });
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[test]
    fn test_explain_indents_inputs() {
        let scan = table_scan();
        let a = scan.output_attr("a").unwrap();
        let plan = LogicalOp::project(scan, ProjectOp::columns([&a]));

        let explain = plan.explain(0);
        let lines: Vec<&str> = explain.lines().collect();
        assert!(lines[0].starts_with("Project("));
        assert!(lines[1].starts_with("  Scan(t"));
    }
}
