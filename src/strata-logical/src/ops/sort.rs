//! Sort operator.

use serde::{Deserialize, Serialize};

use crate::expr::LogicalExpr;

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    /// Expression to sort by.
    pub expr: LogicalExpr,

    /// Sort direction (ascending if true).
    pub ascending: bool,

    /// Nulls first (if true, NULLs come before non-NULLs).
    pub nulls_first: bool,
}

impl SortKey {
    /// Create a new ascending sort key.
    pub const fn asc(expr: LogicalExpr) -> Self {
        Self {
            expr,
            ascending: true,
            nulls_first: false,
        }
    }

    /// Create a new descending sort key.
    pub const fn desc(expr: LogicalExpr) -> Self {
        Self {
            expr,
            ascending: false,
            nulls_first: true,
        }
    }

    /// Set nulls first.
    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls_first = true;
        self
    }

    /// Set nulls last.
    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.nulls_first = false;
        self
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = if self.ascending { "ASC" } else { "DESC" };
        let nulls = if self.nulls_first {
            "NULLS FIRST"
        } else {
            "NULLS LAST"
        };
        write!(f, "{} {dir} {nulls}", self.expr)
    }
}

/// Sort operator - orders the output rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOp {
    /// Sort keys, most significant first.
    pub keys: Vec<SortKey>,
}

impl SortOp {
    /// Create a new sort operation.
    pub const fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }
}

impl std::fmt::Display for SortOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        write!(f, "Sort([{}])", keys.join(", "))
    }
}
