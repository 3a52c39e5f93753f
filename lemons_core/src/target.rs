use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use crate::domain::{Role, Trade};
use crate::error::SetupError;
use crate::payoff::PayoffTable;

/// Computes forward discounted sum of rewards for every step of trajectory.
///
/// For step `i`: `target[i] = sum_{j >= i} rate^(j - i) * reward[j]`.
/// Computation is done with upper triangular weight matrix `W[i][j] = rate^(j-i)` (zero for `j < i`)
/// multiplied by the reward matrix, so every column of rewards is discounted independently in one pass.
/// For long trajectories weights of distant steps underflow to `0`, which is expected.
/// ```
/// use ndarray::array;
/// use lemons_core::target::discounted_returns;
/// let rewards = array![[1.0f32, 2.0], [2.0, 0.0], [4.0, 4.0]];
/// let targets = discounted_returns(rewards.view(), 0.5);
/// assert_eq!(targets, array![[3.0, 3.0], [4.0, 2.0], [4.0, 4.0]]);
/// ```
pub fn discounted_returns(rewards: ArrayView2<f32>, discount_rate: f32) -> Array2<f32>{
    let n = rewards.nrows();
    let weights = Array2::from_shape_fn((n, n), |(i, j)|{
        if j >= i{
            discount_rate.powi((j - i) as i32)
        } else {
            0.0
        }
    });
    weights.dot(&rewards)
}

/// Standard target: discounted future payoffs of both players.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountedTargets{
    discount_rate: f32,
    deception_weight: f32,
    table: PayoffTable,
}

impl DiscountedTargets{

    /// Creates target computer. Discount rate must be in `(0, 1]`.
    pub fn new(discount_rate: f32, deception_weight: f32) -> Result<Self, SetupError>{
        Self::with_table(discount_rate, deception_weight, PayoffTable::default())
    }

    pub fn with_table(discount_rate: f32, deception_weight: f32, table: PayoffTable) -> Result<Self, SetupError>{
        if !(discount_rate > 0.0 && discount_rate <= 1.0){
            #[cfg(feature = "log_warn")]
            log::warn!("Rejected discount rate {discount_rate}");
            return Err(SetupError::illegal_parameter("discount_rate", discount_rate, "expected value in (0, 1]"));
        }
        if !deception_weight.is_finite(){
            return Err(SetupError::illegal_parameter("deception_weight", deception_weight, "expected finite value"));
        }
        Ok(Self{discount_rate, deception_weight, table})
    }

    pub fn discount_rate(&self) -> f32{
        self.discount_rate
    }

    pub fn deception_weight(&self) -> f32{
        self.deception_weight
    }

    /// Target matrix of shape `[trajectory.len(), 2]` (seller column, buyer column).
    pub fn targets(&self, trajectory: &[Trade]) -> Array2<f32>{
        let rewards = self.table.payoffs(trajectory, self.deception_weight);
        let targets = discounted_returns(rewards.view(), self.discount_rate);
        #[cfg(feature = "log_trace")]
        log::trace!("Targets of trajectory with {} steps: {:?}", trajectory.len(), targets);
        targets
    }
}

impl Default for DiscountedTargets{
    fn default() -> Self {
        Self{
            discount_rate: 0.5,
            deception_weight: 0.0,
            table: PayoffTable::default()
        }
    }
}

/// Function producing learning targets for agent of given role from its full game trajectory.
/// Output must have one value per trade in trajectory.
pub trait TargetFunction: Send + Sync{
    fn targets_for(&self, role: Role, trajectory: &[Trade]) -> Array1<f32>;
}

impl TargetFunction for DiscountedTargets{
    fn targets_for(&self, role: Role, trajectory: &[Trade]) -> Array1<f32> {
        self.targets(trajectory).column(role.payoff_column()).to_owned()
    }
}

impl<F: Fn(Role, &[Trade]) -> Array1<f32> + Send + Sync> TargetFunction for F{
    fn targets_for(&self, role: Role, trajectory: &[Trade]) -> Array1<f32> {
        self(role, trajectory)
    }
}

#[cfg(test)]
mod tests{
    use ndarray::{Array2, array};
    use crate::domain::{CarType, Decision, Role, Trade};
    use crate::payoff::payoffs;
    use crate::target::{discounted_returns, DiscountedTargets, TargetFunction};

    #[test]
    fn no_decay_sums_future(){
        let n = 7;
        let rewards = Array2::from_elem((n, 2), 3.0f32);
        let targets = discounted_returns(rewards.view(), 1.0);
        for i in 0..n{
            assert_eq!(targets[[i, 0]], 3.0 * (n - i) as f32);
            assert_eq!(targets[[i, 1]], 3.0 * (n - i) as f32);
        }
    }

    #[test]
    fn single_step_is_reward(){
        let trades = [Trade::new(CarType::Peach, 11.0, Decision::Bought)];
        let computer = DiscountedTargets::new(0.5, 0.0).unwrap();
        assert_eq!(computer.targets(&trades), array![[1.0, 1.0]]);
        assert_eq!(computer.targets(&trades), payoffs(&trades, 0.0));
    }

    #[test]
    fn matches_backward_recursion(){
        let trades = vec![
            Trade::new(CarType::Lemon, 7.0, Decision::Bought),
            Trade::new(CarType::Peach, 11.0, Decision::Declined),
            Trade::new(CarType::Peach, 11.0, Decision::Bought),
            Trade::new(CarType::Lemon, 2.0, Decision::Bought),
        ];
        let rate = 0.7f32;
        let rewards = payoffs(&trades, -0.5);
        let targets = DiscountedTargets::new(rate, -0.5).unwrap().targets(&trades);
        let mut running = [0.0f32; 2];
        for i in (0..trades.len()).rev(){
            for c in 0..2{
                running[c] = rewards[[i, c]] + rate * running[c];
                assert!((targets[[i, c]] - running[c]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn long_trajectory_stays_finite(){
        let n = 2000;
        let rewards = Array2::from_elem((n, 2), 1.0f32);
        let targets = discounted_returns(rewards.view(), 0.5);
        assert!(targets.iter().all(|v| v.is_finite()));
        assert!((targets[[0, 0]] - 2.0).abs() < 1e-4);
        assert_eq!(targets[[n - 1, 1]], 1.0);
    }

    #[test]
    fn empty_trajectory(){
        let computer = DiscountedTargets::default();
        assert_eq!(computer.targets(&[]).shape(), &[0, 2]);
        assert_eq!(computer.targets_for(Role::Buyer, &[]).len(), 0);
    }

    #[test]
    fn role_selects_column(){
        let trades = [Trade::new(CarType::Lemon, 7.0, Decision::Bought)];
        let computer = DiscountedTargets::default();
        assert_eq!(computer.targets_for(Role::Seller, &trades), array![6.0]);
        assert_eq!(computer.targets_for(Role::Buyer, &trades), array![-5.0]);
    }

    #[test]
    fn boxed_closure_is_target_function(){
        let constant: Box<dyn TargetFunction> = Box::new(|_role: Role, trajectory: &[Trade]| ndarray::Array1::from_elem(trajectory.len(), 2.0f32));
        let trades = [Trade::new(CarType::Lemon, 7.0, Decision::Bought); 3];
        assert_eq!(constant.targets_for(Role::Seller, &trades), array![2.0, 2.0, 2.0]);
        let discounted: Box<dyn TargetFunction> = Box::new(DiscountedTargets::default());
        assert_eq!(discounted.targets_for(Role::Buyer, &trades[..1]), array![-5.0]);
    }

    #[test]
    fn illegal_discount_rate(){
        assert!(DiscountedTargets::new(0.0, 0.0).is_err());
        assert!(DiscountedTargets::new(1.5, 0.0).is_err());
        assert!(DiscountedTargets::new(f32::NAN, 0.0).is_err());
        assert!(DiscountedTargets::new(1.0, 0.0).is_ok());
    }
}
