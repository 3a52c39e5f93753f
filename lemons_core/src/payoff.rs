use enum_map::{enum_map, EnumMap};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use crate::domain::{CarType, Trade};

/// Cost of producing a lemon for the seller.
pub const LEMON_COST: f32 = 1.0;
/// Cost of producing a peach for the seller.
pub const PEACH_COST: f32 = 10.0;
/// Value of a lemon for the buyer.
pub const LEMON_VALUE: f32 = 2.0;
/// Value of a peach for the buyer.
pub const PEACH_VALUE: f32 = 12.0;

/// Reward model of the market. Stores for every [`CarType`] its cost for the seller and its
/// value for the buyer.
/// > For a trade that took place:
/// > + seller gets `price - cost(car)`,
/// > + buyer gets `value(car) - price`.
/// >
/// > When buyer declines both get `0`.
///
/// Seller's payoff can be additionally shifted by `deception_weight * |seller - buyer|`.
/// Positive weight rewards extracting disproportionate surplus, negative weight punishes
/// seller for the asymmetry (models penalty for deception).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffTable{
    cost: EnumMap<CarType, f32>,
    value: EnumMap<CarType, f32>,
}

impl Default for PayoffTable{
    fn default() -> Self {
        Self::new(LEMON_COST, PEACH_COST, LEMON_VALUE, PEACH_VALUE)
    }
}

impl PayoffTable{

    pub fn new(lemon_cost: f32, peach_cost: f32, lemon_value: f32, peach_value: f32) -> Self{
        Self{
            cost: enum_map! {
                CarType::Lemon => lemon_cost,
                CarType::Peach => peach_cost,
            },
            value: enum_map! {
                CarType::Lemon => lemon_value,
                CarType::Peach => peach_value,
            }
        }
    }

    pub fn cost(&self, car_type: CarType) -> f32{
        self.cost[car_type]
    }

    pub fn value(&self, car_type: CarType) -> f32{
        self.value[car_type]
    }

    /// Payoff pair `(seller, buyer)` for single trade.
    /// ```
    /// use lemons_core::domain::{CarType, Decision, Trade};
    /// use lemons_core::payoff::PayoffTable;
    /// let table = PayoffTable::default();
    /// let trade = Trade::new(CarType::Lemon, 7.0, Decision::Bought);
    /// assert_eq!(table.payoff(&trade, 0.0), (6.0, -5.0));
    /// assert_eq!(table.payoff(&trade, -1.0), (-5.0, -5.0));
    /// ```
    pub fn payoff(&self, trade: &Trade, deception_weight: f32) -> (f32, f32){
        if !trade.is_trade(){
            return (0.0, 0.0);
        }
        let seller = trade.price - self.cost[trade.car_type];
        let buyer = self.value[trade.car_type] - trade.price;
        (seller + deception_weight * (seller - buyer).abs(), buyer)
    }

    /// Computes payoffs for the whole trajectory at once.
    /// Output has shape `[trades.len(), 2]`, column `0` holds seller's payoffs and column `1`
    /// buyer's (see [`Role::payoff_column`](crate::domain::Role::payoff_column)).
    pub fn payoffs(&self, trades: &[Trade], deception_weight: f32) -> Array2<f32>{
        let bought: Array1<f32> = trades.iter().map(|t| t.decision.as_f32()).collect();
        let prices: Array1<f32> = trades.iter().map(|t| t.price).collect();
        let costs: Array1<f32> = trades.iter().map(|t| self.cost[t.car_type]).collect();
        let values: Array1<f32> = trades.iter().map(|t| self.value[t.car_type]).collect();

        let seller = &bought * &(&prices - &costs);
        let buyer = &bought * &(&values - &prices);
        let asymmetry = (&seller - &buyer).mapv(f32::abs);
        let seller = seller + asymmetry * deception_weight;

        let mut result = Array2::<f32>::zeros((trades.len(), 2));
        result.column_mut(0).assign(&seller);
        result.column_mut(1).assign(&buyer);
        result
    }
}

/// Shortcut for [`PayoffTable::payoffs`] on default table.
pub fn payoffs(trades: &[Trade], deception_weight: f32) -> Array2<f32>{
    PayoffTable::default().payoffs(trades, deception_weight)
}

#[cfg(test)]
mod tests{
    use crate::domain::{CarType, Decision, Trade};
    use crate::payoff::{payoffs, PayoffTable};

    fn sample() -> Vec<Trade>{
        vec![
            Trade::new(CarType::Peach, 11.0, Decision::Bought),
            Trade::new(CarType::Lemon, 7.0, Decision::Bought),
            Trade::new(CarType::Lemon, 3.0, Decision::Declined),
            Trade::new(CarType::Peach, 12.0, Decision::Declined),
            Trade::new(CarType::Lemon, 2.0, Decision::Bought),
        ]
    }

    #[test]
    fn declined_trades_pay_nothing(){
        for w in [-1.0, 0.0, 0.5, 2.0]{
            let p = payoffs(&sample(), w);
            for row in [2, 3]{
                assert_eq!(p[[row, 0]], 0.0);
                assert_eq!(p[[row, 1]], 0.0);
            }
        }
    }

    #[test]
    fn pure_economic_payoff_without_weight(){
        let trades = sample();
        let p = payoffs(&trades, 0.0);
        let table = PayoffTable::default();
        for (i, t) in trades.iter().enumerate(){
            if t.is_trade(){
                assert_eq!(p[[i, 0]], t.price - table.cost(t.car_type));
                assert_eq!(p[[i, 1]], table.value(t.car_type) - t.price);
            }
        }
        assert_eq!(p[[0, 0]], 1.0);
        assert_eq!(p[[0, 1]], 1.0);
    }

    #[test]
    fn deception_penalty(){
        let p = payoffs(&sample(), -1.0);
        assert_eq!(p[[1, 0]], -5.0);
        assert_eq!(p[[1, 1]], -5.0);
        // honest lemon: seller 1, buyer 0
        assert_eq!(p[[4, 0]], 0.0);
    }

    #[test]
    fn vectorised_matches_single(){
        let table = PayoffTable::default();
        let trades = sample();
        let p = table.payoffs(&trades, 0.3);
        for (i, t) in trades.iter().enumerate(){
            let (s, b) = table.payoff(t, 0.3);
            assert!((p[[i, 0]] - s).abs() < 1e-6);
            assert!((p[[i, 1]] - b).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_trajectory(){
        let p = payoffs(&[], 0.0);
        assert_eq!(p.shape(), &[0, 2]);
    }
}
