//! Evaluation of partition predicates against a single partition's values.
//!
//! Predicates pushed into a partition listing may only reference partition
//! columns, so a partition's values are all the evaluator ever sees. Columns
//! are looked up by name, ignoring case. Logic is three-valued: a comparison
//! with null is null, and a predicate that evaluates to null rejects the
//! partition.

use std::collections::HashMap;

use common_error::{StrataError, StrataResult};
use strata_core::types::cast_partition_value;
use strata_core::{DataType, TimeZone, Value};
use strata_logical::expr::builtin;
use strata_logical::{BinaryOp, FuncExpr, LogicalExpr, UnaryOp};

/// Named values of one partition.
#[derive(Debug, Clone, Default)]
pub struct PartitionValues {
    by_name: HashMap<String, Value>,
    names: Vec<String>,
}

impl PartitionValues {
    /// Build from `(column, value)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut values = Self::default();
        for (name, value) in pairs {
            values.by_name.insert(name.to_lowercase(), value);
            values.names.push(name);
        }
        values
    }

    /// Look up a column, ignoring case.
    pub fn get(&self, name: &str) -> StrataResult<&Value> {
        self.by_name
            .get(&name.to_lowercase())
            .ok_or_else(|| StrataError::column_not_found(name, self.names.iter().cloned()))
    }
}

/// Evaluates deterministic scalar expressions over partition values.
#[derive(Debug, Clone, Copy)]
pub struct PartitionEvaluator {
    time_zone: TimeZone,
}

impl Default for PartitionEvaluator {
    fn default() -> Self {
        Self::new(TimeZone::utc())
    }
}

impl PartitionEvaluator {
    /// Create an evaluator; `time_zone` applies to string-to-timestamp casts.
    pub const fn new(time_zone: TimeZone) -> Self {
        Self { time_zone }
    }

    /// Whether every predicate evaluates to true.
    pub fn matches_all(
        &self,
        predicates: &[LogicalExpr],
        values: &PartitionValues,
    ) -> StrataResult<bool> {
        for predicate in predicates {
            if !self.evaluate_predicate(predicate, values)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluate a predicate; null counts as false.
    pub fn evaluate_predicate(
        &self,
        predicate: &LogicalExpr,
        values: &PartitionValues,
    ) -> StrataResult<bool> {
        match self.evaluate(predicate, values)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(StrataError::type_error(format!(
                "predicate `{predicate}` evaluated to non-boolean {}",
                other.type_name()
            ))),
        }
    }

    /// Evaluate an expression to a value.
    pub fn evaluate(&self, expr: &LogicalExpr, values: &PartitionValues) -> StrataResult<Value> {
        match expr {
            LogicalExpr::Literal(value) => Ok(value.clone()),
            LogicalExpr::Column(attr) => values.get(&attr.name).cloned(),
            LogicalExpr::Binary { left, op, right } => {
                let l = self.evaluate(left, values)?;
                let r = self.evaluate(right, values)?;
                binary(&l, *op, &r)
            }
            LogicalExpr::Unary { op, expr } => unary(*op, self.evaluate(expr, values)?),
            LogicalExpr::InList {
                expr,
                list,
                negated,
            } => {
                let needle = self.evaluate(expr, values)?;
                let candidates = list
                    .iter()
                    .map(|e| self.evaluate(e, values))
                    .collect::<StrataResult<Vec<_>>>()?;
                let found = in_list(&needle, &candidates)?;
                Ok(if *negated { not(found)? } else { found })
            }
            LogicalExpr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let v = self.evaluate(expr, values)?;
                let lo = binary(&v, BinaryOp::GtEq, &self.evaluate(low, values)?)?;
                let hi = binary(&v, BinaryOp::LtEq, &self.evaluate(high, values)?)?;
                let within = binary(&lo, BinaryOp::And, &hi)?;
                Ok(if *negated { not(within)? } else { within })
            }
            LogicalExpr::Cast { expr, data_type } => {
                self.cast(self.evaluate(expr, values)?, *data_type)
            }
            LogicalExpr::Function(func) => self.function(func, values),
            LogicalExpr::Alias { expr, .. } => self.evaluate(expr, values),
            LogicalExpr::Aggregate(agg) => Err(StrataError::evaluation(format!(
                "aggregate `{agg}` cannot be evaluated against a single partition"
            ))),
        }
    }

    fn function(&self, func: &FuncExpr, values: &PartitionValues) -> StrataResult<Value> {
        let args = func
            .args
            .iter()
            .map(|a| self.evaluate(a, values))
            .collect::<StrataResult<Vec<_>>>()?;

        match func.name.to_ascii_lowercase().as_str() {
            builtin::COALESCE => Ok(args.into_iter().find(|v| !v.is_null()).unwrap_or(Value::Null)),
            name @ (builtin::UPPER | builtin::LOWER) => match args.as_slice() {
                [Value::Null] => Ok(Value::Null),
                [Value::String(s)] if name == builtin::UPPER => Ok(Value::String(s.to_uppercase())),
                [Value::String(s)] => Ok(Value::String(s.to_lowercase())),
                _ => Err(StrataError::type_error(format!(
                    "{name} expects a single string argument"
                ))),
            },
            other => Err(StrataError::not_implemented(format!(
                "function `{other}` in partition predicates"
            ))),
        }
    }

    fn cast(&self, value: Value, data_type: DataType) -> StrataResult<Value> {
        if value.is_null() || value.data_type() == data_type {
            return Ok(value);
        }

        match (&value, data_type) {
            (Value::String(s), _) => cast_partition_value(Some(s), data_type, &self.time_zone),
            (_, DataType::String) => Ok(Value::String(raw_string(&value))),
            (Value::Int32(i), DataType::Int64) => Ok(Value::Int64(i64::from(*i))),
            (Value::Int64(i), DataType::Int32) => i32::try_from(*i)
                .map(Value::Int32)
                .map_err(|_| StrataError::type_error(format!("{i} does not fit in Int32"))),
            (Value::Int32(_) | Value::Int64(_), DataType::Float64) => value
                .as_float64()
                .map(Value::Float64)
                .ok_or_else(|| StrataError::internal("integer without float view")),
            (Value::Date(d), DataType::Timestamp) => {
                Ok(Value::Timestamp(i64::from(*d) * 86_400 * 1_000_000_000))
            }
            _ => Err(StrataError::type_error(format!(
                "cannot cast {} to {data_type}",
                value.type_name()
            ))),
        }
    }
}

fn raw_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn not(value: Value) -> StrataResult<Value> {
    unary(UnaryOp::Not, value)
}

fn unary(op: UnaryOp, value: Value) -> StrataResult<Value> {
    match (op, &value) {
        (UnaryOp::IsNull, _) => Ok(Value::Bool(value.is_null())),
        (UnaryOp::IsNotNull, _) => Ok(Value::Bool(!value.is_null())),
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int32(i)) => Ok(Value::Int32(i.wrapping_neg())),
        (UnaryOp::Neg, Value::Int64(i)) => Ok(Value::Int64(i.wrapping_neg())),
        (UnaryOp::Neg, Value::Float64(f)) => Ok(Value::Float64(-f)),
        _ => Err(StrataError::type_error(format!(
            "cannot apply {op} to {}",
            value.type_name()
        ))),
    }
}

fn truth(value: &Value) -> StrataResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(StrataError::type_error(format!(
            "expected a boolean, found {}",
            other.type_name()
        ))),
    }
}

fn binary(left: &Value, op: BinaryOp, right: &Value) -> StrataResult<Value> {
    if op.is_logical() {
        let (l, r) = (truth(left)?, truth(right)?);
        let result = match op {
            BinaryOp::And => match (l, r) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            _ => match (l, r) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
        };
        return Ok(result.map_or(Value::Null, Value::Bool));
    }

    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if op.is_comparison() {
        let ordering = left.compare(right).ok_or_else(|| {
            StrataError::type_error(format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ))
        })?;
        let result = match op {
            BinaryOp::Eq => ordering.is_eq(),
            BinaryOp::NotEq => ordering.is_ne(),
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::LtEq => ordering.is_le(),
            BinaryOp::Gt => ordering.is_gt(),
            _ => ordering.is_ge(),
        };
        return Ok(Value::Bool(result));
    }

    arithmetic(left, op, right)
}

fn arithmetic(left: &Value, op: BinaryOp, right: &Value) -> StrataResult<Value> {
    let mismatch = || {
        StrataError::type_error(format!(
            "cannot apply {op} to {} and {}",
            left.type_name(),
            right.type_name()
        ))
    };

    if matches!(left, Value::Float64(_)) || matches!(right, Value::Float64(_)) {
        let (a, b) = (
            left.as_float64().ok_or_else(mismatch)?,
            right.as_float64().ok_or_else(mismatch)?,
        );
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide if b == 0.0 => return Ok(Value::Null),
            BinaryOp::Divide => a / b,
            _ if b == 0.0 => return Ok(Value::Null),
            _ => a % b,
        };
        return Ok(Value::Float64(result));
    }

    let (a, b) = (
        left.as_int64().ok_or_else(mismatch)?,
        right.as_int64().ok_or_else(mismatch)?,
    );
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Subtract => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide if b == 0 => return Ok(Value::Null),
        BinaryOp::Divide => a.checked_div(b),
        _ if b == 0 => return Ok(Value::Null),
        _ => a.checked_rem(b),
    };
    result
        .map(Value::Int64)
        .ok_or_else(|| StrataError::evaluation(format!("integer overflow in {a} {op} {b}")))
}

fn in_list(needle: &Value, candidates: &[Value]) -> StrataResult<Value> {
    if needle.is_null() {
        return Ok(Value::Null);
    }
    let mut saw_null = false;
    for candidate in candidates {
        match binary(needle, BinaryOp::Eq, candidate)? {
            Value::Bool(true) => return Ok(Value::Bool(true)),
            Value::Null => saw_null = true,
            _ => {}
        }
    }
    Ok(if saw_null { Value::Null } else { Value::Bool(false) })
}
