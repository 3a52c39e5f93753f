use getset::CopyGetters;
use serde::{Deserialize, Serialize};
use lemons_core::domain::Role;

/// Result of single call to [`MarketAgent::fit`](crate::agent::MarketAgent::fit).
#[derive(Debug, Clone, PartialEq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct FitSummary{
    agent: usize,
    role: Role,
    games: usize,
    examples: usize,
    train_size: usize,
    holdout_size: usize,
    train_mse: f32,
    /// `None` when no example was held out.
    holdout_mse: Option<f32>,
}

impl FitSummary{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(agent: usize, role: Role, games: usize, examples: usize, train_size: usize,
                      holdout_size: usize, train_mse: f32, holdout_mse: Option<f32>) -> Self{
        Self{agent, role, games, examples, train_size, holdout_size, train_mse, holdout_mse}
    }
}
