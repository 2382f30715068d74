//! Core error types for Strata.

use thiserror::Error;

/// Result type alias using `StrataError`.
pub type StrataResult<T> = std::result::Result<T, StrataError>;

/// Core error type for Strata operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrataError {
    /// Type mismatch or invalid type operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Schema-related error (ambiguous reference, malformed schema, etc.).
    #[error("SchemaError: {0}")]
    SchemaError(String),

    /// A named column could not be resolved against a relation.
    #[error("ColumnNotFound: unable to find the column `{column}` given [{}]", .available.join(", "))]
    ColumnNotFound {
        /// The column that was looked up.
        column: String,
        /// The columns the relation actually exposes.
        available: Vec<String>,
    },

    /// Partition catalog or file listing failure.
    #[error("CatalogError: {0}")]
    CatalogError(String),

    /// Expression evaluation failure.
    #[error("EvaluationError: {0}")]
    EvaluationError(String),

    /// An optimizer rule reached a state its own matching logic rules out.
    ///
    /// Kept apart from [`StrataError::InternalError`] so callers can tell a
    /// broken rewrite invariant from other bugs, and because the message
    /// carries the configuration key that switches the offending rule off.
    #[error(
        "OptimizerInvariant: {message}. As a workaround, disable the rule by setting `{disable_key}` to false"
    )]
    OptimizerInvariant {
        /// What went wrong.
        message: String,
        /// Configuration key that disables the rule.
        disable_key: String,
    },

    /// Feature not yet implemented.
    #[error("NotImplemented: {0}")]
    NotImplemented(String),

    /// Internal error (bug in Strata).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl StrataError {
    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `SchemaError`.
    pub fn schema_error<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a new `ColumnNotFound` error.
    pub fn column_not_found<S, I, T>(column: S, available: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::ColumnNotFound {
            column: column.into(),
            available: available.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a new `CatalogError`.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Self::CatalogError(msg.into())
    }

    /// Create a new `EvaluationError`.
    pub fn evaluation<S: Into<String>>(msg: S) -> Self {
        Self::EvaluationError(msg.into())
    }

    /// Create a new `OptimizerInvariant` error.
    pub fn optimizer_invariant<M: Into<String>, K: Into<String>>(
        message: M,
        disable_key: K,
    ) -> Self {
        Self::OptimizerInvariant {
            message: message.into(),
            disable_key: disable_key.into(),
        }
    }

    /// Create a new `NotImplemented` error.
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Ensure a condition holds, returning an `EvaluationError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::StrataError::EvaluationError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::StrataError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with a `ValueError`.
#[macro_export]
macro_rules! value_err {
    ($($arg:tt)*) => {
        return Err($crate::StrataError::ValueError(format!($($arg)*)))
    };
}

/// Return early with a `TypeError`.
#[macro_export]
macro_rules! type_err {
    ($($arg:tt)*) => {
        return Err($crate::StrataError::TypeError(format!($($arg)*)))
    };
}
