//! Logical expression system.
//!
//! Expressions are the smallest semantic units used in predicates,
//! projections and aggregations. Column references carry an
//! [`AttributeRef`], so every expression knows exactly which operator output
//! it reads regardless of the names involved.

use serde::{Deserialize, Serialize};

use strata_core::{DataType, Value};

use super::{AggExpr, AggFunc, BinaryOp, Determinism, FuncExpr, UnaryOp};
use crate::attribute::{AttributeRef, AttributeSet, ExprId};

/// A logical expression in a query plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalExpr {
    /// A literal constant value.
    Literal(Value),

    /// A resolved column reference.
    Column(AttributeRef),

    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Self>,
        /// Binary operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Self>,
    },

    /// A unary operation.
    Unary {
        /// Unary operator.
        op: UnaryOp,
        /// Operand.
        expr: Box<Self>,
    },

    /// A scalar function call.
    Function(FuncExpr),

    /// An aggregate call (only valid in Aggregate context).
    Aggregate(AggExpr),

    /// `expr [NOT] IN (list)`.
    InList {
        /// Tested expression.
        expr: Box<Self>,
        /// Candidate values.
        list: Vec<Self>,
        /// Whether this is `NOT IN`.
        negated: bool,
    },

    /// `expr [NOT] BETWEEN low AND high`.
    Between {
        /// Tested expression.
        expr: Box<Self>,
        /// Inclusive lower bound.
        low: Box<Self>,
        /// Inclusive upper bound.
        high: Box<Self>,
        /// Whether this is `NOT BETWEEN`.
        negated: bool,
    },

    /// A type cast.
    Cast {
        /// Expression to cast.
        expr: Box<Self>,
        /// Target type.
        data_type: DataType,
    },

    /// A named expression, introducing a new attribute.
    Alias {
        /// Aliased expression.
        expr: Box<Self>,
        /// Output name.
        name: String,
        /// Identity of the produced attribute.
        id: ExprId,
    },
}

impl LogicalExpr {
    // ========== Constructors ==========

    /// Create a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a column reference expression.
    pub fn column(attr: &AttributeRef) -> Self {
        Self::Column(attr.clone())
    }

    /// Create a binary expression.
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression.
    pub fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Create a cast expression.
    pub fn cast(expr: Self, data_type: DataType) -> Self {
        Self::Cast {
            expr: Box::new(expr),
            data_type,
        }
    }

    /// Name this expression, allocating a fresh attribute identity.
    #[must_use]
    pub fn alias(self, name: impl Into<String>) -> Self {
        Self::Alias {
            expr: Box::new(self),
            name: name.into(),
            id: ExprId::next(),
        }
    }

    /// Create an `IN` list test.
    #[must_use]
    pub fn in_list(self, list: Vec<Self>) -> Self {
        Self::InList {
            expr: Box::new(self),
            list,
            negated: false,
        }
    }

    /// Create a `BETWEEN` test.
    #[must_use]
    pub fn between(self, low: Self, high: Self) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    // ========== Operator builders ==========

    /// Create an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    /// Create an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    /// Create a NOT expression.
    #[must_use]
    pub fn logical_not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    /// Create an equality expression.
    #[must_use]
    pub fn eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    /// Create an inequality expression.
    #[must_use]
    pub fn not_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    /// Create a less than expression.
    #[must_use]
    pub fn lt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    /// Create a less than or equal expression.
    #[must_use]
    pub fn lt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::LtEq, other)
    }

    /// Create a greater than expression.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    /// Create a greater than or equal expression.
    #[must_use]
    pub fn gt_eq(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::GtEq, other)
    }

    /// Create an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::unary(UnaryOp::IsNull, self)
    }

    /// Create an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::unary(UnaryOp::IsNotNull, self)
    }

    /// Create an addition expression.
    #[must_use]
    pub fn add_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    /// Create a subtraction expression.
    #[must_use]
    pub fn sub_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Subtract, other)
    }

    /// Create a multiplication expression.
    #[must_use]
    pub fn mul_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Multiply, other)
    }

    /// Create a division expression.
    #[must_use]
    pub fn div_expr(self, other: Self) -> Self {
        Self::binary(self, BinaryOp::Divide, other)
    }

    // ========== Analysis methods ==========

    /// Direct children of this expression.
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Literal(_) | Self::Column(_) => vec![],
            Self::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::Unary { expr, .. } | Self::Cast { expr, .. } | Self::Alias { expr, .. } => {
                vec![expr.as_ref()]
            }
            Self::Aggregate(agg) => vec![agg.expr.as_ref()],
            Self::Function(func) => func.args.iter().collect(),
            Self::InList { expr, list, .. } => {
                let mut children = vec![expr.as_ref()];
                children.extend(list);
                children
            }
            Self::Between {
                expr, low, high, ..
            } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
        }
    }

    /// All attributes read by this expression.
    pub fn references(&self) -> AttributeSet {
        let mut refs = AttributeSet::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut AttributeSet) {
        if let Self::Column(attr) = self {
            refs.insert(attr.clone());
        }
        for child in self.children() {
            child.collect_references(refs);
        }
    }

    /// Check if this expression contains an aggregate call.
    pub fn contains_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate(_)) || self.children().iter().any(|c| c.contains_aggregate())
    }

    /// Every aggregate call embedded in this expression, outermost first.
    ///
    /// Aggregate arguments are not searched: a nested aggregate is not a
    /// separate call of the enclosing Aggregate operator.
    pub fn collect_aggregates(&self) -> Vec<&AggExpr> {
        let mut out = Vec::new();
        self.collect_aggregates_into(&mut out);
        out
    }

    fn collect_aggregates_into<'a>(&'a self, out: &mut Vec<&'a AggExpr>) {
        match self {
            Self::Aggregate(agg) => out.push(agg),
            other => {
                for child in other.children() {
                    child.collect_aggregates_into(out);
                }
            }
        }
    }

    /// Check if this expression is deterministic.
    pub fn is_deterministic(&self) -> bool {
        let own = match self {
            Self::Function(func) => func.determinism() == Determinism::Deterministic,
            _ => true,
        };
        own && self.children().iter().all(|c| c.is_deterministic())
    }

    /// Rewrite the expression bottom-up.
    #[must_use]
    pub fn transform_up<F>(self, f: &F) -> Self
    where
        F: Fn(Self) -> Self,
    {
        let rewritten = match self {
            Self::Literal(_) | Self::Column(_) => self,
            Self::Binary { left, op, right } => Self::Binary {
                left: Box::new(left.transform_up(f)),
                op,
                right: Box::new(right.transform_up(f)),
            },
            Self::Unary { op, expr } => Self::Unary {
                op,
                expr: Box::new(expr.transform_up(f)),
            },
            Self::Function(func) => Self::Function(FuncExpr {
                args: func.args.into_iter().map(|a| a.transform_up(f)).collect(),
                ..func
            }),
            Self::Aggregate(agg) => Self::Aggregate(AggExpr {
                expr: Box::new(agg.expr.transform_up(f)),
                ..agg
            }),
            Self::InList {
                expr,
                list,
                negated,
            } => Self::InList {
                expr: Box::new(expr.transform_up(f)),
                list: list.into_iter().map(|e| e.transform_up(f)).collect(),
                negated,
            },
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => Self::Between {
                expr: Box::new(expr.transform_up(f)),
                low: Box::new(low.transform_up(f)),
                high: Box::new(high.transform_up(f)),
                negated,
            },
            Self::Cast { expr, data_type } => Self::Cast {
                expr: Box::new(expr.transform_up(f)),
                data_type,
            },
            Self::Alias { expr, name, id } => Self::Alias {
                expr: Box::new(expr.transform_up(f)),
                name,
                id,
            },
        };
        f(rewritten)
    }

    /// Result type of this expression.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Literal(value) => value.data_type(),
            Self::Column(attr) => attr.data_type,
            Self::Binary { left, op, right } => {
                if op.is_arithmetic() {
                    let (l, r) = (left.data_type(), right.data_type());
                    l.common_supertype(&r).unwrap_or(l)
                } else {
                    DataType::Bool
                }
            }
            Self::Unary { op, expr } => {
                if op.is_predicate() {
                    DataType::Bool
                } else {
                    expr.data_type()
                }
            }
            Self::Function(func) => func.return_type.unwrap_or(DataType::Null),
            Self::Aggregate(agg) => agg.result_type(),
            Self::InList { .. } | Self::Between { .. } => DataType::Bool,
            Self::Cast { data_type, .. } => *data_type,
            Self::Alias { expr, .. } => expr.data_type(),
        }
    }

    /// Whether this expression may evaluate to null.
    pub fn nullable(&self) -> bool {
        match self {
            Self::Literal(value) => value.is_null(),
            Self::Column(attr) => attr.nullable,
            Self::Unary {
                op: UnaryOp::IsNull | UnaryOp::IsNotNull,
                ..
            } => false,
            Self::Aggregate(agg) if agg.func == AggFunc::Count => false,
            Self::Alias { expr, .. } => expr.nullable(),
            _ => true,
        }
    }

    /// Name of the column this expression produces.
    pub fn output_name(&self) -> String {
        match self {
            Self::Column(attr) => attr.name.clone(),
            Self::Alias { name, .. } => name.clone(),
            Self::Literal(value) => value.to_string(),
            Self::Binary { left, op, right } => {
                format!("({} {op} {})", left.output_name(), right.output_name())
            }
            Self::Aggregate(agg) => {
                let func = agg.func.name().to_lowercase();
                if agg.distinct {
                    format!("{func}(DISTINCT {})", agg.expr.output_name())
                } else {
                    format!("{func}({})", agg.expr.output_name())
                }
            }
            Self::Function(func) => {
                let args: Vec<String> = func.args.iter().map(Self::output_name).collect();
                format!("{}({})", func.name, args.join(", "))
            }
            Self::Cast { expr, data_type } => {
                format!("CAST({} AS {data_type})", expr.output_name())
            }
            other => other.to_string(),
        }
    }

    /// The attribute this expression produces, if it is named.
    pub fn to_attribute(&self) -> Option<AttributeRef> {
        match self {
            Self::Column(attr) => Some(attr.clone()),
            Self::Alias { expr, name, id } => Some(AttributeRef {
                name: name.clone(),
                data_type: expr.data_type(),
                nullable: expr.nullable(),
                id: *id,
            }),
            _ => None,
        }
    }

    /// Whether the expression already names its output.
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Column(_) | Self::Alias { .. })
    }

    /// Name the expression after itself when it is not named yet.
    #[must_use]
    pub fn into_named(self) -> Self {
        if self.is_named() {
            self
        } else {
            let name = self.output_name();
            self.alias(name)
        }
    }
}

/// Split a predicate into its top-level AND operands.
pub fn split_conjunctive_predicates(predicate: &LogicalExpr) -> Vec<LogicalExpr> {
    match predicate {
        LogicalExpr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => {
            let mut out = split_conjunctive_predicates(left);
            out.extend(split_conjunctive_predicates(right));
            out
        }
        other => vec![other.clone()],
    }
}

/// AND a list of predicates together; `None` for an empty list.
pub fn conjunction(predicates: impl IntoIterator<Item = LogicalExpr>) -> Option<LogicalExpr> {
    predicates.into_iter().reduce(LogicalExpr::and)
}

/// Reference a column.
pub fn col(attr: &AttributeRef) -> LogicalExpr {
    LogicalExpr::column(attr)
}

/// Literal value.
pub fn lit(value: impl Into<Value>) -> LogicalExpr {
    LogicalExpr::literal(value)
}

impl std::fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Column(attr) => write!(f, "{attr}"),
            Self::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Unary { op, expr } if op.is_postfix() => write!(f, "({expr} {op})"),
            Self::Unary { op, expr } => write!(f, "{op} {expr}"),
            Self::Function(func) => {
                let args: Vec<String> = func.args.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", func.name, args.join(", "))
            }
            Self::Aggregate(agg) => write!(f, "{agg}"),
            Self::InList {
                expr,
                list,
                negated,
            } => {
                let items: Vec<String> = list.iter().map(ToString::to_string).collect();
                let not = if *negated { " NOT" } else { "" };
                write!(f, "({expr}{not} IN ({}))", items.join(", "))
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "({expr}{not} BETWEEN {low} AND {high})")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Alias { expr, name, id } => write!(f, "{expr} AS {name}#{id}"),
        }
    }
}
