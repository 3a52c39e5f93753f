use thiserror::Error;
use crate::error::LemonsError;

/// Broken invariants of collected data.
/// > These are bookkeeping bugs and are never coerced or truncated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError{
    #[error("Data should have the same length, but left is {left:} and right is {right:}. {context:}")]
    LengthMismatch{
        left: usize,
        right: usize,
        context: String,
    },
    #[error("Expected feature vector of width {expected}, got {got}")]
    FeatureWidth{
        expected: usize,
        got: usize,
    },
    #[error("Failed to assemble matrix: {0}")]
    Shape(String),
}

impl From<DataError> for LemonsError{
    fn from(error: DataError) -> LemonsError{
        LemonsError::Data{
            error,
        }
    }
}

impl From<ndarray::ShapeError> for DataError{
    fn from(value: ndarray::ShapeError) -> Self {
        Self::Shape(value.to_string())
    }
}

impl From<ndarray::ShapeError> for LemonsError{
    fn from(value: ndarray::ShapeError) -> Self {
        DataError::from(value).into()
    }
}
