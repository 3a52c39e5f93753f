use thiserror::Error;
use crate::error::LemonsError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LearningError{
    #[error("Insufficient history: requested {requested} games, but only {recorded} recorded")]
    InsufficientHistory{
        requested: usize,
        recorded: usize,
    },
    #[error("Empty training data")]
    NoTrainingData,
}


impl From<LearningError> for LemonsError{
    fn from(error: LearningError) -> Self {
        Self::Learning {
            error
        }
    }
}
