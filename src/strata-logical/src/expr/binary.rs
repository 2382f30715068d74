//! Binary operators for logical expressions.

use serde::{Deserialize, Serialize};

/// Binary operators for logical expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Modulo (%)
    Modulo,

    // Comparison operators
    /// Equality (=)
    Eq,
    /// Inequality (<>)
    NotEq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    LtEq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    GtEq,

    // Logical operators (three-valued)
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl BinaryOp {
    /// Check if this is an arithmetic operator.
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }

    /// Check if this is a comparison operator.
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Check if this is a logical operator.
    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Operator symbol used when rendering expressions.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOp::Add.is_arithmetic());
        assert!(BinaryOp::LtEq.is_comparison());
        assert!(BinaryOp::And.is_logical());
        assert!(!BinaryOp::Or.is_comparison());
    }

    #[test]
    fn test_display() {
        assert_eq!(BinaryOp::NotEq.to_string(), "<>");
        assert_eq!(BinaryOp::And.to_string(), "AND");
    }
}
