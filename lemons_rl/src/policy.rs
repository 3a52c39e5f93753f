use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Enum used to select action from predicted payoffs of candidates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionSelector{
    /// Sample from softmax of predictions multiplied by `alpha`.
    /// Larger `alpha` makes policy greedier, `alpha` close to `0` makes it uniform.
    Boltzmann{
        alpha: f64
    },
    /// Always select action with maximal predicted payoff (do not explore).
    Max,
}

impl Default for ActionSelector{
    fn default() -> Self {
        Self::Boltzmann {alpha: 1.0}
    }
}

impl ActionSelector{

    /// Probability of selecting each candidate.
    ///
    /// Predictions are shifted by their maximum before exponentiation, which does not change
    /// distribution but keeps `exp` in range for any finite input.
    /// If any prediction is not finite distribution is uniform.
    /// ```
    /// use lemons_rl::policy::ActionSelector;
    /// let p = ActionSelector::Boltzmann {alpha: 1.0}.probabilities(&[0.0, 2.0f32.ln()]);
    /// assert!((p[0] - 1.0/3.0).abs() < 1e-6);
    /// assert!((p[1] - 2.0/3.0).abs() < 1e-6);
    /// ```
    pub fn probabilities(&self, predictions: &[f32]) -> Vec<f64>{
        let n = predictions.len();
        if n == 0{
            return Vec::new();
        }
        if predictions.iter().any(|p| !p.is_finite()){
            #[cfg(feature = "log_warn")]
            log::warn!("Value model returned non-finite predictions {:?}, selecting uniformly", predictions);
            return vec![1.0 / n as f64; n];
        }
        match self{
            ActionSelector::Boltzmann {alpha} => {
                let max = predictions.iter().fold(f64::NEG_INFINITY, |acc, p| acc.max(*p as f64));
                let weights: Vec<f64> = predictions.iter()
                    .map(|p| ((*p as f64 - max) * alpha).exp())
                    .collect();
                let sum: f64 = weights.iter().sum();
                weights.into_iter().map(|w| w / sum).collect()
            },
            ActionSelector::Max => {
                let mut probs = vec![0.0; n];
                probs[argmax(predictions)] = 1.0;
                probs
            }
        }
    }

    /// Selects index of candidate. With exploring disabled candidate with maximal prediction
    /// is taken regardless of selector. Returns `None` for empty predictions.
    pub fn select_index<R: Rng + ?Sized>(&self, predictions: &[f32], rng: &mut R, exploring_enabled: bool) -> Option<usize>{
        if predictions.is_empty(){
            return None;
        }
        if !exploring_enabled{
            return Some(argmax(predictions));
        }
        match self{
            ActionSelector::Max => Some(argmax(predictions)),
            ActionSelector::Boltzmann {..} => {
                let probs = self.probabilities(predictions);
                WeightedIndex::new(&probs).ok().map(|d| d.sample(rng))
            }
        }
    }
}

fn argmax(values: &[f32]) -> usize{
    values.iter().enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, v)|{
            if *v > best { (i, *v) } else { (best_i, best) }
        }).0
}

#[cfg(test)]
mod tests{
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::policy::ActionSelector;

    #[test]
    fn probabilities_sum_to_one(){
        let selector = ActionSelector::Boltzmann {alpha: 3.0};
        for predictions in [
            vec![0.0f32],
            vec![1.0, 2.0, 3.0],
            vec![-1000.0, 1000.0, 0.0],
            vec![5.0; 12],
            vec![1.0e30, -1.0e30],
        ]{
            let p = selector.probabilities(&predictions);
            assert_eq!(p.len(), predictions.len());
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(p.iter().all(|x| x.is_finite() && *x >= 0.0));
        }
    }

    #[test]
    fn shift_invariance(){
        let selector = ActionSelector::Boltzmann {alpha: 0.7};
        let a = selector.probabilities(&[1.0, 4.0, -2.0]);
        let b = selector.probabilities(&[101.0, 104.0, 98.0]);
        for (x, y) in a.iter().zip(b.iter()){
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn non_finite_predictions_are_uniform(){
        let p = ActionSelector::default().probabilities(&[f32::NAN, 1.0]);
        assert_eq!(p, vec![0.5, 0.5]);
    }

    #[test]
    fn greedy_when_not_exploring(){
        let mut rng = StdRng::seed_from_u64(0);
        let selector = ActionSelector::Boltzmann {alpha: 0.001};
        for _ in 0..20{
            assert_eq!(selector.select_index(&[0.0, 3.0, 1.0], &mut rng, false), Some(1));
        }
        assert_eq!(ActionSelector::Max.select_index(&[2.0, 1.0], &mut rng, true), Some(0));
        assert_eq!(selector.select_index(&[], &mut rng, true), None);
    }

    #[test]
    fn sampling_explores(){
        let mut rng = StdRng::seed_from_u64(42);
        let selector = ActionSelector::Boltzmann {alpha: 1.0};
        let mut counts = [0usize; 3];
        for _ in 0..3000{
            let i = selector.select_index(&[0.0, 0.0, 0.0], &mut rng, true).unwrap();
            counts[i] += 1;
        }
        assert!(counts.iter().all(|c| *c > 800));
    }
}
