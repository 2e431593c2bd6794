//! Error types for indagar operations.
//!
//! Every failure mode here is a contract violation by the caller: malformed
//! index sets, negative noise variance, mismatched dimensions. Numerical
//! degeneracy during conditioning is never an error; it is absorbed by
//! clamping and reported through the metrics sink.

use std::fmt;

/// Main error type for indagar operations.
///
/// # Examples
///
/// ```
/// use indagar::error::IndagarError;
///
/// let err = IndagarError::DimensionMismatch {
///     expected: "4 rows".to_string(),
///     actual: "3 rows".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum IndagarError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An index referred to a position outside the joint index space.
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Size of the index space
        len: usize,
    },

    /// The same index appeared twice in an evidence or target index list.
    DuplicateIndex {
        /// The repeated index
        index: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// An operation received an empty collection it cannot work with.
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for IndagarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndagarError::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {expected}, got {actual}")
            }
            IndagarError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds (len={len})")
            }
            IndagarError::DuplicateIndex { index } => {
                write!(f, "duplicate index {index} in index list")
            }
            IndagarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            IndagarError::EmptyInput { context } => write!(f, "empty input: {context}"),
            IndagarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for IndagarError {}

impl From<&str> for IndagarError {
    fn from(msg: &str) -> Self {
        IndagarError::Other(msg.to_string())
    }
}

impl From<String> for IndagarError {
    fn from(msg: String) -> Self {
        IndagarError::Other(msg)
    }
}

impl IndagarError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an index out of bounds error
    #[must_use]
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for IndagarError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<IndagarError> for &str {
    fn eq(&self, other: &IndagarError) -> bool {
        *self == other.to_string()
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, IndagarError>;
