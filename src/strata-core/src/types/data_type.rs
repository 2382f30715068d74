//! Data type definitions for Strata schemas.

use serde::{Deserialize, Serialize};

/// Data type for schema columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Null type (unknown or absent).
    Null,
    /// Boolean type.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Binary,
    /// Timestamp with nanosecond precision, normalized to UTC.
    Timestamp,
    /// Date (days since epoch).
    Date,
}

impl DataType {
    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::Float64)
    }

    /// Check if this type is a string type.
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    /// Check if this type is a temporal type.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Timestamp | Self::Date)
    }

    /// Get the display name for this type.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Binary => "Binary",
            Self::Timestamp => "Timestamp",
            Self::Date => "Date",
        }
    }

    /// Check if this type can be coerced to another type.
    pub fn can_coerce_to(&self, target: &Self) -> bool {
        if self == target {
            return true;
        }

        matches!(
            (self, target),
            (Self::Null, _)
                | (Self::Int32, Self::Int64 | Self::Float64)
                | (Self::Int64, Self::Float64)
                | (Self::Date, Self::Timestamp)
        )
    }

    /// Get the common supertype of two types (for type inference).
    pub fn common_supertype(&self, other: &Self) -> Option<Self> {
        if self == other {
            return Some(*self);
        }
        if self.can_coerce_to(other) {
            Some(*other)
        } else if other.can_coerce_to(self) {
            Some(*self)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_coercion() {
        assert!(DataType::Int64.can_coerce_to(&DataType::Float64));
        assert!(DataType::Int32.can_coerce_to(&DataType::Int64));
        assert!(DataType::Null.can_coerce_to(&DataType::String));
        assert!(!DataType::String.can_coerce_to(&DataType::Int64));
    }

    #[test]
    fn test_common_supertype() {
        assert_eq!(
            DataType::Int64.common_supertype(&DataType::Float64),
            Some(DataType::Float64)
        );
        assert_eq!(
            DataType::Timestamp.common_supertype(&DataType::Date),
            Some(DataType::Timestamp)
        );
        assert_eq!(DataType::Bool.common_supertype(&DataType::String), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(DataType::Timestamp.to_string(), "Timestamp");
        assert!(DataType::Date.is_temporal());
        assert!(DataType::Int32.is_numeric());
    }
}
