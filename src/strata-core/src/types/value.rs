//! Runtime value representation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::DataType;

/// Runtime value in Strata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Binary(Vec<u8>),
    /// Timestamp (nanoseconds since Unix epoch, UTC).
    Timestamp(i64),
    /// Date (days since Unix epoch).
    Date(i32),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Self::Int32(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Self::Float64(f) => Some(*f),
            Self::Int32(i) => Some(f64::from(*i)),
            Self::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The data type of this value.
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Bool,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::String(_) => DataType::String,
            Self::Binary(_) => DataType::Binary,
            Self::Timestamp(_) => DataType::Timestamp,
            Self::Date(_) => DataType::Date,
        }
    }

    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        self.data_type().display_name()
    }

    /// Compare two non-null values, widening numerics and dates as needed.
    ///
    /// Returns `None` when either side is null or the types are not
    /// comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Binary(a), Self::Binary(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Date(d), Self::Timestamp(t)) => Some(date_to_nanos(*d).cmp(t)),
            (Self::Timestamp(t), Self::Date(d)) => Some(t.cmp(&date_to_nanos(*d))),
            (Self::Float64(_), _) | (_, Self::Float64(_)) => {
                let (a, b) = (self.as_float64()?, other.as_float64()?);
                a.partial_cmp(&b)
            }
            _ => {
                let (a, b) = (self.as_int64()?, other.as_int64()?);
                Some(a.cmp(&b))
            }
        }
    }
}

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

fn date_to_nanos(days: i32) -> i64 {
    i64::from(days).saturating_mul(NANOS_PER_DAY)
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::Binary(b) => {
                let hex: String = b.iter().map(|x| format!("{x:02X}")).collect();
                write!(f, "X'{hex}'")
            }
            Self::Timestamp(ns) => write!(f, "TIMESTAMP({ns})"),
            Self::Date(days) => write!(f, "DATE({days})"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(42i64).as_int64(), Some(42));
        assert_eq!(Value::from(7i32).as_int64(), Some(7));
        assert_eq!(Value::from(2.5f64).as_float64(), Some(2.5));
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::Bool(true).type_name(), "Bool");
        assert_eq!(Value::Date(1).data_type(), DataType::Date);
    }

    #[test]
    fn test_compare_widens_numerics() {
        assert_eq!(Value::Int32(3).compare(&Value::Int64(3)), Some(Ordering::Equal));
        assert_eq!(
            Value::Int64(2).compare(&Value::Float64(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Date(1).compare(&Value::Timestamp(NANOS_PER_DAY)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_null_and_mismatch() {
        assert_eq!(Value::Null.compare(&Value::Int64(1)), None);
        assert_eq!(Value::from("a").compare(&Value::Int64(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("us").to_string(), "'us'");
        assert_eq!(Value::Int64(5).to_string(), "5");
        assert_eq!(Value::Binary(vec![0xab, 0x01]).to_string(), "X'AB01'");
    }
}
