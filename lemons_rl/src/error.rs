use thiserror::Error;
use lemons_core::error::{LearningError, LemonsError};


/// Error type that wraps standard [`LemonsError`] and adds failures of value models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LemonsRlError{
    /// Variant - [`LemonsError`]
    #[error("Basic lemons error: {source}")]
    Lemons{
        #[source]
        source: LemonsError
    },
    /// Input matrix or target vector does not fit model.
    #[error("Dimension mismatch: expected {expected}, got {got} in context: {context:}")]
    DimensionMismatch{
        expected: usize,
        got: usize,
        context: String
    },
    #[error("Training loss is not finite: {0}")]
    NonFiniteLoss(f32),
    #[error("Empty training data")]
    NoTrainingData,
}

impl From<LemonsError> for LemonsRlError{
    fn from(value: LemonsError) -> Self {
        Self::Lemons{source: value}
    }
}

impl From<LemonsRlError> for LemonsError{
    fn from(value: LemonsRlError) -> Self {
        match value{
            LemonsRlError::Lemons{source: n} => n,
            LemonsRlError::NoTrainingData => LearningError::NoTrainingData.into(),
            any => LemonsError::Model{context: format!("{}", any)}
        }
    }
}
