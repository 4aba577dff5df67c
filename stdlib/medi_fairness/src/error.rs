//! Error types for fairness computations

use thiserror::Error;

/// Errors that abort a fairness computation.
///
/// Empty subgroups and zero denominators are not errors; they surface as
/// undefined (`None`) rates instead.
#[derive(Debug, Error)]
pub enum FairnessError {
    #[error("shape mismatch: column `{column}` has {found} entries, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid binary value {value} at index {index} in column `{column}` (expected 0 or 1)")]
    InvalidBinaryValue {
        column: String,
        index: usize,
        value: i64,
    },
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("unknown rate: {0}")]
    UnknownRate(String),
    #[error("attribute already present: {0}")]
    DuplicateAttribute(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("subgroup enumeration would produce {count} subgroups, limit is {limit}")]
    TooManySubgroups { count: usize, limit: usize },
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FairnessError>;

impl FairnessError {
    pub(crate) fn shape(column: impl Into<String>, expected: usize, found: usize) -> Self {
        FairnessError::ShapeMismatch {
            column: column.into(),
            expected,
            found,
        }
    }
}
