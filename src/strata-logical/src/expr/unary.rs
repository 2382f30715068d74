//! Unary operators for logical expressions.

use serde::{Deserialize, Serialize};

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical NOT.
    Not,
    /// Numeric negation.
    Neg,
    /// Is null check.
    IsNull,
    /// Is not null check.
    IsNotNull,
}

impl UnaryOp {
    /// Whether the operator always yields a boolean.
    pub const fn is_predicate(&self) -> bool {
        !matches!(self, Self::Neg)
    }

    /// Whether the operator is written after its operand.
    pub const fn is_postfix(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Not => write!(f, "NOT"),
            Self::Neg => write!(f, "-"),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}
