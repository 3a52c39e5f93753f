use thiserror::Error;
use crate::error::LemonsError;

/// Errors detected when constructing agents, games or configurations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError{
    #[error("Number of sellers ({sellers}) does not match number of buyers ({buyers})")]
    PlayerCountMismatch{
        sellers: usize,
        buyers: usize,
    },
    #[error("Value can't be probability: {0}")]
    NotAProbability(f64),
    #[error("Probabilities must sum to 1, they sum to {0}")]
    ProbabilitiesNotNormalized(f64),
    #[error("Parameter {name} has illegal value {value}: {expected}")]
    IllegalParameter{
        name: String,
        value: String,
        expected: String,
    },
    #[error("Strategy set of {0} agent is empty")]
    EmptyStrategySet(String),
    #[error("Buyer strategy must be decision 0 or 1, got {0}")]
    IllegalBuyerStrategy(f32),
    #[error("Unknown player type: {0}")]
    UnknownPlayerType(String),
}

impl SetupError{
    pub fn illegal_parameter(name: &str, value: impl ToString, expected: &str) -> Self{
        Self::IllegalParameter {
            name: name.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

impl From<SetupError> for LemonsError{
    fn from(source: SetupError) -> Self {
        Self::Setup { source }
    }
}
