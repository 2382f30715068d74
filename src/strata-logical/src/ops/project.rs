//! Project operator.
//!
//! Project reduces the column set and computes derived columns.

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeRef;
use crate::expr::LogicalExpr;

/// Project operator - column selection and computation.
///
/// Every expression is named: plain column references keep the identity of
/// the column they read, anything else is wrapped in an alias with a fresh
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOp {
    /// Expressions to project.
    pub expressions: Vec<LogicalExpr>,
}

impl ProjectOp {
    /// Create a new projection, naming unnamed expressions.
    pub fn new(expressions: Vec<LogicalExpr>) -> Self {
        Self {
            expressions: expressions
                .into_iter()
                .map(LogicalExpr::into_named)
                .collect(),
        }
    }

    /// Project the given attributes unchanged.
    pub fn columns<'a>(attrs: impl IntoIterator<Item = &'a AttributeRef>) -> Self {
        Self {
            expressions: attrs.into_iter().map(LogicalExpr::column).collect(),
        }
    }

    /// Add an expression to the projection.
    #[must_use]
    pub fn with_expr(mut self, expr: LogicalExpr) -> Self {
        self.expressions.push(expr.into_named());
        self
    }

    /// Get the output column names.
    pub fn output_names(&self) -> Vec<String> {
        self.expressions
            .iter()
            .map(LogicalExpr::output_name)
            .collect()
    }

    /// Attributes produced by the projection.
    pub fn output(&self) -> Vec<AttributeRef> {
        self.expressions
            .iter()
            .filter_map(LogicalExpr::to_attribute)
            .collect()
    }
}

impl std::fmt::Display for ProjectOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<String> = self.expressions.iter().map(ToString::to_string).collect();
        write!(f, "Project([{}])", items.join(", "))
    }
}
