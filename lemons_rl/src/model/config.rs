use serde::{Deserialize, Serialize};
use lemons_core::error::SetupError;

/// Structure for basic training configuration data.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig{
    /// Number of rows in one gradient step.
    pub batch_size: usize,
    /// Number of passes over training rows in one call to fit.
    pub epochs: usize,
    /// Fraction of examples held out from training to measure generalisation, in `[0, 1)`.
    pub holdout_fraction: f64,
}

impl Default for FitConfig{
    fn default() -> Self {
        Self{
            batch_size: 100,
            epochs: 1,
            holdout_fraction: 0.1,
        }
    }
}

impl FitConfig{
    pub fn validate(&self) -> Result<(), SetupError>{
        if self.batch_size == 0{
            return Err(SetupError::illegal_parameter("batch_size", self.batch_size, "expected positive value"));
        }
        if self.epochs == 0{
            return Err(SetupError::illegal_parameter("epochs", self.epochs, "expected positive value"));
        }
        if !(0.0..1.0).contains(&self.holdout_fraction){
            return Err(SetupError::illegal_parameter("holdout_fraction", self.holdout_fraction, "expected value in [0, 1)"));
        }
        Ok(())
    }
}
