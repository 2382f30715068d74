//! Filter operator for predicate-based filtering.

use serde::{Deserialize, Serialize};

use crate::expr::LogicalExpr;

/// Filter operator - keeps rows for which the predicate is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOp {
    /// Filter predicate (must evaluate to bool).
    pub predicate: LogicalExpr,
}

impl FilterOp {
    /// Create a new filter operation.
    pub const fn new(predicate: LogicalExpr) -> Self {
        Self { predicate }
    }
}
