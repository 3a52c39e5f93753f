use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use lemons_core::error::LemonsError;
use lemons_rl::agent::FitSummary;
use lemons_rl::model::ValueModel;
use crate::game::{GameLog, MarketGame};
use crate::stats::{calculate_statistics, MarketStatisticsMean};

/// Summary of one epoch: games played, agents refitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport{
    pub epoch: usize,
    pub games: usize,
    /// Statistics averaged over agents and games of the epoch.
    pub statistics: MarketStatisticsMean,
    pub fit: Vec<FitSummary>,
}

/// Self-play driver: plays batches of games and refits agents between them.
pub struct MarketSimulation<M: ValueModel>{
    game: MarketGame<M>,
    epochs_done: usize,
}

impl<M: ValueModel> MarketSimulation<M>{

    pub fn new(game: MarketGame<M>) -> Self{
        Self{game, epochs_done: 0}
    }

    pub fn game(&self) -> &MarketGame<M>{
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut MarketGame<M>{
        &mut self.game
    }

    pub fn into_game(self) -> MarketGame<M>{
        self.game
    }

    /// Plays `play_games` games with random pairings and returns their logs.
    pub fn play(&mut self, play_games: usize) -> Result<&[GameLog], LemonsError>{
        let start = self.game.logs().len();
        for _ in 0..play_games{
            self.game.play_game()?;
        }
        Ok(&self.game.logs()[start..])
    }

    /// Fits every seller and buyer on its examples from the last `fit_games` games.
    pub fn fit_players(&mut self, fit_games: usize) -> Result<Vec<FitSummary>, LemonsError>{
        let fit_config = self.game.config().fit_config();
        let (agents, pool) = self.game.agents_and_pool_mut();
        let summaries = match pool{
            Some(pool) => pool.install(||{
                agents.into_par_iter()
                    .map(|agent| agent.fit(fit_games, &fit_config))
                    .collect::<Result<Vec<_>, LemonsError>>()
            }),
            None => agents.into_iter()
                .map(|agent| agent.fit(fit_games, &fit_config))
                .collect::<Result<Vec<_>, LemonsError>>()
        }?;
        if let Some(mean_holdout) = mean_holdout_mse(&summaries){
            info!("Fitted {} agents on {} games, mean holdout mse: {:.3}", summaries.len(), fit_games, mean_holdout);
        }
        Ok(summaries)
    }

    /// Plays `play_games` games and then fits agents on the last `fit_games` games.
    pub fn run(&mut self, fit_games: usize, play_games: usize) -> Result<Vec<FitSummary>, LemonsError>{
        self.play(play_games)?;
        self.fit_players(fit_games)
    }

    /// Runs `epochs` rounds of [`run`](Self::run) with game counts from config.
    pub fn run_epochs(&mut self, epochs: usize) -> Result<Vec<EpochReport>, LemonsError>{
        let (fit_games, play_games) = (self.game.config().fit_games, self.game.config().play_games);
        let n_pairs = self.game.n_pairs();
        let mut reports = Vec::with_capacity(epochs);
        for _ in 0..epochs{
            let statistics = calculate_statistics(self.play(play_games)?, n_pairs)?.mean();
            let fit = self.fit_players(fit_games)?;
            info!("Epoch {}: trades per game (seller) {:.2}, honest {:.3}, trust {:.3}",
                self.epochs_done, statistics.sellers.trades, statistics.sellers.honest_fraction, statistics.buyers.trust_fraction);
            reports.push(EpochReport{
                epoch: self.epochs_done,
                games: play_games,
                statistics,
                fit,
            });
            self.epochs_done += 1;
        }
        Ok(reports)
    }
}

fn mean_holdout_mse(summaries: &[FitSummary]) -> Option<f32>{
    let values: Vec<f32> = summaries.iter().filter_map(|s| s.holdout_mse()).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
}

#[cfg(test)]
mod tests{
    use lemons_core::error::{LearningError, LemonsError};
    use lemons_rl::model::LinearValueModel;
    use crate::config::SimulationConfig;
    use crate::game::MarketGameBuilder;
    use crate::simulation::MarketSimulation;

    fn simulation(config: SimulationConfig) -> MarketSimulation<LinearValueModel>{
        let game = MarketGameBuilder::new(config)
            .populate(|_, i| LinearValueModel::new(10, 0.01, i as u64)).unwrap()
            .build().unwrap();
        MarketSimulation::new(game)
    }

    #[test]
    fn run_plays_then_fits(){
        let config = SimulationConfig{n_pairs: 3, n_iterations: 8, seed: Some(1), ..Default::default()};
        let mut sim = simulation(config);
        let summaries = sim.run(2, 4).unwrap();
        assert_eq!(sim.game().logs().len(), 4);
        assert_eq!(summaries.len(), 6);
        assert!(summaries.iter().all(|s| s.examples() == 16));
        assert!(sim.game().sellers().iter().all(|s| s.model().is_fitted()));
    }

    #[test]
    fn fit_before_play_fails(){
        let config = SimulationConfig{n_pairs: 2, n_iterations: 3, seed: Some(1), ..Default::default()};
        let mut sim = simulation(config);
        let err = sim.fit_players(1).unwrap_err();
        assert_eq!(err, LemonsError::Learning {error: LearningError::InsufficientHistory {requested: 1, recorded: 0}});
    }

    #[test]
    fn epochs_report_statistics(){
        let config = SimulationConfig{
            n_pairs: 2,
            n_iterations: 10,
            play_games: 3,
            fit_games: 3,
            seed: Some(4),
            threads: Some(2),
            ..Default::default()
        };
        let mut sim = simulation(config);
        let reports = sim.run_epochs(2).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].epoch, 1);
        for report in &reports{
            assert_eq!(report.fit.len(), 4);
            assert!(report.statistics.sellers.trades <= 10.0);
            assert!((0.0..=1.0).contains(&report.statistics.sellers.honest_fraction));
            assert_eq!(report.statistics.sellers.trades, report.statistics.buyers.trades);
        }
        assert_eq!(sim.game().logs().len(), 6);
    }
}
