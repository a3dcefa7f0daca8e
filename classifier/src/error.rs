use std::fmt;

use crate::DataError;

/// Errors produced while fitting or querying a classifier.
#[derive(Debug)]
pub enum ClassifierError {
    /// A hyperparameter is out of its valid domain.
    InvalidParams(&'static str),

    /// A shape invariant was violated (e.g. a feature vector of the wrong length).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "features").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// A deserialized model violates a structural invariant.
    CorruptModel(String),

    /// The training data could not be used.
    Data(DataError),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierError::InvalidParams(msg) => write!(f, "invalid parameters: {msg}"),
            ClassifierError::ShapeMismatch { what, got, expected } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            ClassifierError::CorruptModel(msg) => write!(f, "corrupt model: {msg}"),
            ClassifierError::Data(e) => write!(f, "data error: {e}"),
        }
    }
}

impl std::error::Error for ClassifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClassifierError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for ClassifierError {
    fn from(value: DataError) -> Self {
        Self::Data(value)
    }
}
