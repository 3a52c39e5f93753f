use std::path::PathBuf;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lemons_core::error::SetupError;
use lemons_market::config::{CarDistribution, SimulationConfig};

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq)]
pub enum ModelSelect{
    Linear,
    Mlp,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct MarketOptions{

    #[arg(short = 'v', long = "log_level", value_enum, default_value = "info")]
    pub log_level: LevelFilter,

    #[arg(short = 'M', long = "market_log_level", value_enum, default_value = "info")]
    pub market_log_level: LevelFilter,

    #[arg(short = 'R', long = "rl_log_level", value_enum, default_value = "warn")]
    pub rl_log_level: LevelFilter,

    #[arg(short = 'C', long = "core_log_level", value_enum, default_value = "warn")]
    pub core_log_level: LevelFilter,

    #[arg(short = 'o', long = "logfile")]
    pub log_file: Option<PathBuf>,

    /// File to write epoch reports as JSON.
    #[arg(short = 'j', long = "json")]
    pub json_file: Option<PathBuf>,

    #[arg(short = 'e', long = "epochs", default_value = "10")]
    pub epochs: usize,

    #[arg(short = 'n', long = "pairs", default_value = "10")]
    pub n_pairs: usize,

    #[arg(short = 'i', long = "iterations", default_value = "20")]
    pub n_iterations: usize,

    #[arg(short = 'l', long = "lemon-probability", default_value = "0.25")]
    pub lemon_probability: f64,

    #[arg(short = 'd', long = "discount", default_value = "0.5")]
    pub discount_rate: f32,

    #[arg(short = 'w', long = "deception-weight", default_value = "0.0", allow_hyphen_values = true)]
    pub deception_weight: f32,

    #[arg(short = 'a', long = "alpha", default_value = "1.0")]
    pub alpha: f64,

    #[arg(short = 'p', long = "play-games", default_value = "10")]
    pub play_games: usize,

    #[arg(short = 'f', long = "fit-games", default_value = "10")]
    pub fit_games: usize,

    #[arg(long = "holdout", default_value = "0.1")]
    pub holdout_fraction: f64,

    #[arg(short = 'b', long = "batch", default_value = "100")]
    pub batch_size: usize,

    #[arg(long = "fit-epochs", default_value = "1")]
    pub fit_epochs: usize,

    #[arg(short = 'm', long = "model", value_enum, default_value = "linear")]
    pub model: ModelSelect,

    #[arg(short = 'H', long = "hidden", default_value = "32")]
    pub hidden_width: usize,

    #[arg(short = 'r', long = "learning-rate", default_value = "0.01")]
    pub learning_rate: f32,

    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Threads playing pairs in parallel, sequential when not set.
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,
}

impl MarketOptions{

    pub fn simulation_config(&self) -> Result<SimulationConfig, SetupError>{
        let config = SimulationConfig{
            n_pairs: self.n_pairs,
            n_iterations: self.n_iterations,
            car_distribution: CarDistribution::new(self.lemon_probability, 1.0 - self.lemon_probability)?,
            discount_rate: self.discount_rate,
            deception_weight: self.deception_weight,
            alpha: self.alpha,
            play_games: self.play_games,
            fit_games: self.fit_games,
            holdout_fraction: self.holdout_fraction,
            batch_size: self.batch_size,
            fit_epochs: self.fit_epochs,
            seed: self.seed,
            threads: self.threads,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests{
    use clap::Parser;
    use crate::options::{MarketOptions, ModelSelect};

    #[test]
    fn defaults_match_simulation_defaults(){
        let options = MarketOptions::parse_from(["market_for_lemons"]);
        let config = options.simulation_config().unwrap();
        assert_eq!(config, lemons_market::config::SimulationConfig::default());
        assert_eq!(options.model, ModelSelect::Linear);
    }

    #[test]
    fn parses_model_and_negative_weight(){
        let options = MarketOptions::parse_from(["market_for_lemons", "-m", "mlp", "-w", "-0.5", "-s", "7"]);
        assert_eq!(options.model, ModelSelect::Mlp);
        let config = options.simulation_config().unwrap();
        assert_eq!(config.deception_weight, -0.5);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn invalid_probability_is_rejected(){
        let options = MarketOptions::parse_from(["market_for_lemons", "-l", "1.5"]);
        assert!(options.simulation_config().is_err());
    }
}
