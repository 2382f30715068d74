//! Aggregate functions for logical expressions.

use serde::{Deserialize, Serialize};

use strata_core::{DataType, Value};

use super::LogicalExpr;

/// Aggregate function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    /// Count rows (or non-null values)
    Count,
    /// Sum of values
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Average value
    Avg,
    /// First value encountered
    First,
    /// Last value encountered
    Last,
}

/// Closed categorization of aggregate functions by how they treat duplicate
/// input rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggCategory {
    /// `MAX`
    Max,
    /// `MIN`
    Min,
    /// `FIRST`
    First,
    /// `LAST`
    Last,
    /// Everything else.
    Other,
}

impl AggFunc {
    /// Get the result type of this aggregate function given the input type.
    ///
    /// Returns `None` if the operation is not valid for the given type.
    pub fn result_type(&self, input: DataType) -> Option<DataType> {
        match self {
            Self::Count => Some(DataType::Int64),

            Self::Sum => match input {
                DataType::Int32 | DataType::Int64 => Some(DataType::Int64),
                DataType::Float64 => Some(DataType::Float64),
                _ => None,
            },

            Self::Min | Self::Max => match input {
                DataType::Binary => None,
                other => Some(other),
            },

            Self::Avg => input.is_numeric().then_some(DataType::Float64),

            Self::First | Self::Last => Some(input),
        }
    }

    /// Get the function name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Avg => "AVG",
            Self::First => "FIRST",
            Self::Last => "LAST",
        }
    }

    /// Category of this function.
    pub const fn category(&self) -> AggCategory {
        match self {
            Self::Max => AggCategory::Max,
            Self::Min => AggCategory::Min,
            Self::First => AggCategory::First,
            Self::Last => AggCategory::Last,
            Self::Count | Self::Sum | Self::Avg => AggCategory::Other,
        }
    }
}

impl std::fmt::Display for AggFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An aggregate call: function, input and DISTINCT marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggExpr {
    /// The aggregate function.
    pub func: AggFunc,
    /// The input expression.
    pub expr: Box<LogicalExpr>,
    /// Whether DISTINCT is applied.
    pub distinct: bool,
}

impl AggExpr {
    /// Create a new aggregate expression.
    pub fn new(func: AggFunc, expr: LogicalExpr) -> Self {
        Self {
            func,
            expr: Box::new(expr),
            distinct: false,
        }
    }

    /// Set DISTINCT flag.
    #[must_use]
    pub const fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// `COUNT(expr)`.
    pub fn count(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Count, expr)
    }

    /// `COUNT(*)`.
    pub fn count_star() -> Self {
        Self::new(AggFunc::Count, LogicalExpr::Literal(Value::Int64(1)))
    }

    /// `SUM(expr)`.
    pub fn sum(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Sum, expr)
    }

    /// `MIN(expr)`.
    pub fn min(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Min, expr)
    }

    /// `MAX(expr)`.
    pub fn max(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Max, expr)
    }

    /// `AVG(expr)`.
    pub fn avg(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Avg, expr)
    }

    /// `FIRST(expr)`.
    pub fn first(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::First, expr)
    }

    /// `LAST(expr)`.
    pub fn last(expr: LogicalExpr) -> Self {
        Self::new(AggFunc::Last, expr)
    }

    /// Whether the result over a multiset equals the result over its
    /// underlying set.
    pub fn is_duplicate_insensitive(&self) -> bool {
        self.distinct || self.func.category() != AggCategory::Other
    }

    /// Result type of the call; `Null` when the input type is unsupported.
    pub fn result_type(&self) -> DataType {
        self.func
            .result_type(self.expr.data_type())
            .unwrap_or(DataType::Null)
    }
}

impl std::fmt::Display for AggExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.distinct {
            write!(f, "{}(DISTINCT {})", self.func, self.expr)
        } else {
            write!(f, "{}({})", self.func, self.expr)
        }
    }
}

impl From<AggExpr> for LogicalExpr {
    fn from(agg: AggExpr) -> Self {
        Self::Aggregate(agg)
    }
}
