use thiserror::Error;
use crate::error::{DataError, GameError, LearningError, SetupError};

/// Top level crate error, constructed from more specific error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LemonsError{
    /// Configuration rejected before anything was played.
    #[error("Setup error: {source}")]
    Setup{
        #[source]
        source: SetupError
    },
    /// Violation of game protocol, e.g. buyer acting before the price was quoted.
    #[error("Game error: {source}")]
    Game{
        #[source]
        source: GameError
    },
    /// Broken bookkeeping of collected data.
    #[error("Data error: {error}")]
    Data{
        #[source]
        error: DataError,
    },
    /// Error while preparing or running training of value model.
    #[error("Learning error: {error}")]
    Learning{
        #[source]
        error: LearningError,
    },
    /// Error reported by external value model.
    #[error("Value model error: {context}")]
    Model{
        context: String
    },
    /// Special error for policies to generate when no action is available.
    #[error("No action available: {context}")]
    NoActionAvailable{
        context: String
    },
}
