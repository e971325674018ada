use thiserror::Error;

use crate::schema::DataType;

/// Canonical result for core and planner.
pub type Result<T> = std::result::Result<T, Error>;

/// Construction-time failures. Every variant is fatal to the constructor call
/// that produced it; no partial plan is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Wrong arity, mismatched key counts, impossible partition counts.
    #[error("Shape error: {0}")]
    Shape(String),

    /// An expression resolved to a type the operator cannot accept.
    #[error("Type error: cannot {reason} on expression {expr} with type {dtype}")]
    Type {
        expr: String,
        dtype: DataType,
        reason: String,
    },

    /// A deliberately unimplemented path (not a bug).
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Rebuilding would re-execute a side effect.
    #[error("Irreversible: {0}")]
    Irreversible(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    /// Must be unreachable under correct id allocation.
    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub fn type_error(expr: impl ToString, dtype: DataType, reason: impl Into<String>) -> Self {
        Error::Type {
            expr: expr.to_string(),
            dtype,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
