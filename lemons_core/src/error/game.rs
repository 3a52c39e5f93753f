use thiserror::Error;
use crate::error::LemonsError;

/// Errors violating protocol of single game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError{
    #[error("Buyer was asked to act before seller quoted price")]
    PriceNotQuoted,
    #[error("Buyer decision must be 0 or 1, got {0}")]
    IllegalDecision(f32),
    #[error("Pairing is not a bijection between {pairs} sellers and buyers")]
    PairingNotBijective{
        pairs: usize,
    },
    #[error("Pairing table has {table} pairs, but game has {agents} sellers")]
    PairingSizeMismatch{
        table: usize,
        agents: usize,
    },
}

impl From<GameError> for LemonsError{
    fn from(source: GameError) -> Self {
        Self::Game { source }
    }
}
