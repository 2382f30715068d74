//! Expression trees for logical plans.

mod agg;
mod binary;
mod expr;
mod func;
mod unary;

pub use agg::{AggCategory, AggExpr, AggFunc};
pub use binary::BinaryOp;
pub use expr::{LogicalExpr, col, conjunction, lit, split_conjunctive_predicates};
pub use func::{Determinism, FuncExpr, builtin};
pub use unary::UnaryOp;
