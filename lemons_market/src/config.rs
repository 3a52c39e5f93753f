use enum_map::{enum_map, EnumMap};
use rand::Rng;
use serde::{Deserialize, Serialize};
use lemons_core::domain::CarType;
use lemons_core::error::SetupError;
use lemons_core::target::DiscountedTargets;
use lemons_rl::model::FitConfig;

const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// Categorical distribution of car types handed to sellers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDistribution{
    probabilities: EnumMap<CarType, f64>,
}

impl CarDistribution{

    /// ```
    /// use lemons_market::config::CarDistribution;
    /// assert!(CarDistribution::new(0.25, 0.75).is_ok());
    /// assert!(CarDistribution::new(0.5, 0.6).is_err());
    /// assert!(CarDistribution::new(-0.5, 1.5).is_err());
    /// ```
    pub fn new(lemon: f64, peach: f64) -> Result<Self, SetupError>{
        for p in [lemon, peach]{
            if !(0.0..=1.0).contains(&p){
                return Err(SetupError::NotAProbability(p));
            }
        }
        let sum = lemon + peach;
        if (sum - 1.0).abs() > NORMALIZATION_TOLERANCE{
            return Err(SetupError::ProbabilitiesNotNormalized(sum));
        }
        Ok(Self{
            probabilities: enum_map! {
                CarType::Lemon => lemon,
                CarType::Peach => peach,
            }
        })
    }

    pub fn probability(&self, car_type: CarType) -> f64{
        self.probabilities[car_type]
    }

    /// Checks distribution again, useful after deserialization.
    pub fn validate(&self) -> Result<(), SetupError>{
        Self::new(self.probabilities[CarType::Lemon], self.probabilities[CarType::Peach]).map(|_| ())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> CarType{
        if rng.random_bool(self.probabilities[CarType::Peach].clamp(0.0, 1.0)){
            CarType::Peach
        } else {
            CarType::Lemon
        }
    }
}

impl Default for CarDistribution{
    fn default() -> Self {
        Self{
            probabilities: enum_map! {
                CarType::Lemon => 0.25,
                CarType::Peach => 0.75,
            }
        }
    }
}

/// All parameters of simulation. Default values follow classic setting of the experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig{
    /// Number of sellers (and buyers).
    pub n_pairs: usize,
    /// Iterations played by every pair in one game.
    pub n_iterations: usize,
    pub car_distribution: CarDistribution,
    pub discount_rate: f32,
    /// Weight of payoff asymmetry added to seller's payoff (negative punishes deception).
    pub deception_weight: f32,
    /// Softmax multiplier of predicted payoffs.
    pub alpha: f64,
    /// Games played between fits.
    pub play_games: usize,
    /// Number of most recent games used to fit agents.
    pub fit_games: usize,
    pub holdout_fraction: f64,
    pub batch_size: usize,
    pub fit_epochs: usize,
    /// Seed of all random generators, `None` seeds from operating system.
    pub seed: Option<u64>,
    /// Size of rayon pool running pairings in parallel, `None` runs them sequentially.
    pub threads: Option<usize>,
}

impl Default for SimulationConfig{
    fn default() -> Self {
        Self{
            n_pairs: 10,
            n_iterations: 20,
            car_distribution: CarDistribution::default(),
            discount_rate: 0.5,
            deception_weight: 0.0,
            alpha: 1.0,
            play_games: 10,
            fit_games: 10,
            holdout_fraction: 0.1,
            batch_size: 100,
            fit_epochs: 1,
            seed: None,
            threads: None,
        }
    }
}

impl SimulationConfig{

    pub fn validate(&self) -> Result<(), SetupError>{
        if self.n_pairs == 0{
            return Err(SetupError::illegal_parameter("n_pairs", self.n_pairs, "expected at least one pair"));
        }
        if self.n_iterations == 0{
            return Err(SetupError::illegal_parameter("n_iterations", self.n_iterations, "expected at least one iteration"));
        }
        if self.play_games == 0{
            return Err(SetupError::illegal_parameter("play_games", self.play_games, "expected positive value"));
        }
        if self.fit_games == 0{
            return Err(SetupError::illegal_parameter("fit_games", self.fit_games, "expected positive value"));
        }
        if !(self.alpha > 0.0 && self.alpha.is_finite()){
            return Err(SetupError::illegal_parameter("alpha", self.alpha, "expected positive finite value"));
        }
        if self.threads == Some(0){
            return Err(SetupError::illegal_parameter("threads", 0, "expected at least one thread"));
        }
        self.car_distribution.validate()?;
        self.targets()?;
        self.fit_config().validate()
    }

    pub fn fit_config(&self) -> FitConfig{
        FitConfig{
            batch_size: self.batch_size,
            epochs: self.fit_epochs,
            holdout_fraction: self.holdout_fraction,
        }
    }

    pub fn targets(&self) -> Result<DiscountedTargets, SetupError>{
        DiscountedTargets::new(self.discount_rate, self.deception_weight)
    }
}
