//! Scalar function calls.

use serde::{Deserialize, Serialize};

use strata_core::DataType;

use super::LogicalExpr;

/// Whether repeated evaluation over the same input yields the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Determinism {
    /// Same input, same output.
    Deterministic,
    /// Output may vary between evaluations (random numbers, generated ids).
    NonDeterministic,
}

/// Built-in function names.
pub mod builtin {
    /// Uniform random number.
    pub const RAND: &str = "rand";
    /// Alias of `rand`.
    pub const RANDOM: &str = "random";
    /// Random UUID string.
    pub const UUID: &str = "uuid";
    /// Row id unique within a query.
    pub const MONOTONICALLY_INCREASING_ID: &str = "monotonically_increasing_id";
    /// First non-null argument.
    pub const COALESCE: &str = "coalesce";
    /// Upper-case a string.
    pub const UPPER: &str = "upper";
    /// Lower-case a string.
    pub const LOWER: &str = "lower";

    pub(crate) const NON_DETERMINISTIC: &[&str] =
        &[RAND, RANDOM, UUID, MONOTONICALLY_INCREASING_ID];
}

/// Function expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncExpr {
    /// Function name.
    pub name: String,
    /// Function arguments.
    pub args: Vec<LogicalExpr>,
    /// Return type (if known).
    pub return_type: Option<DataType>,
}

impl FuncExpr {
    /// Create a new function expression.
    pub fn new(name: impl Into<String>, args: Vec<LogicalExpr>) -> Self {
        Self {
            name: name.into(),
            args,
            return_type: None,
        }
    }

    /// Set the return type.
    #[must_use]
    pub fn with_return_type(mut self, return_type: DataType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Determinism of the function itself, ignoring its arguments.
    pub fn determinism(&self) -> Determinism {
        let name = self.name.to_ascii_lowercase();
        if builtin::NON_DETERMINISTIC.contains(&name.as_str()) {
            Determinism::NonDeterministic
        } else {
            Determinism::Deterministic
        }
    }
}

impl LogicalExpr {
    /// Create a `rand()` call.
    pub fn rand() -> Self {
        Self::Function(FuncExpr::new(builtin::RAND, vec![]).with_return_type(DataType::Float64))
    }

    /// Create a coalesce function call.
    pub fn coalesce(exprs: Vec<LogicalExpr>) -> Self {
        Self::Function(FuncExpr::new(builtin::COALESCE, exprs))
    }

    /// Create an `upper(expr)` call.
    pub fn upper(expr: LogicalExpr) -> Self {
        Self::Function(FuncExpr::new(builtin::UPPER, vec![expr]).with_return_type(DataType::String))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism_by_name() {
        assert_eq!(
            FuncExpr::new("RAND", vec![]).determinism(),
            Determinism::NonDeterministic
        );
        assert_eq!(
            FuncExpr::new(builtin::UPPER, vec![]).determinism(),
            Determinism::Deterministic
        );
    }
}
