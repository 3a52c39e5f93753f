use enum_map::EnumMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use crate::domain::{CarType, Decision, MarketView, PriceLevel, Role, Trade};
use crate::error::GameError;

/// Width of feature vector, identical for sellers and buyers.
pub const FEATURE_LEN: usize = 10;
/// Position of candidate action, written by agent after extraction.
pub const ACTION_SLOT: usize = 0;
/// Position of observed context: car type for seller, quoted price for buyer.
pub const CONTEXT_SLOT: usize = 1;
/// First position of outcome counters.
pub const COUNTS_OFFSET: usize = 2;

const CAR_ORDER: [CarType; 2] = [CarType::Lemon, CarType::Peach];
const LEVEL_ORDER: [PriceLevel; 2] = [PriceLevel::High, PriceLevel::Low];
const DECISION_ORDER: [Decision; 2] = [Decision::Bought, Decision::Declined];

/// Number of past trades for every combination of car type, price level and decision.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts{
    counts: EnumMap<CarType, EnumMap<PriceLevel, EnumMap<Decision, usize>>>,
}

impl OutcomeCounts{

    pub fn from_trades(trades: &[Trade]) -> Self{
        let mut counts = Self::default();
        for trade in trades{
            counts.register(trade);
        }
        counts
    }

    pub fn register(&mut self, trade: &Trade){
        self.counts[trade.car_type][trade.price_level()][trade.decision] += 1;
    }

    pub fn get(&self, car_type: CarType, level: PriceLevel, decision: Decision) -> usize{
        self.counts[car_type][level][decision]
    }

    pub fn total(&self) -> usize{
        self.counts.values()
            .flat_map(|levels| levels.values())
            .flat_map(|decisions| decisions.values())
            .sum()
    }

    /// Counts in feature order:
    /// lemon-high-bought, lemon-high-declined, lemon-low-bought, lemon-low-declined,
    /// peach-high-bought, peach-high-declined, peach-low-bought, peach-low-declined.
    pub fn to_slots(&self) -> [f32; 8]{
        let mut slots = [0.0; 8];
        let mut i = 0;
        for car in CAR_ORDER{
            for level in LEVEL_ORDER{
                for decision in DECISION_ORDER{
                    slots[i] = self.counts[car][level][decision] as f32;
                    i += 1;
                }
            }
        }
        slots
    }
}

fn features_with_context(context: f32, past: &[Trade]) -> Array1<f32>{
    let mut features = Array1::zeros(FEATURE_LEN);
    features[CONTEXT_SLOT] = context;
    for (i, count) in OutcomeCounts::from_trades(past).to_slots().into_iter().enumerate(){
        features[COUNTS_OFFSET + i] = count;
    }
    #[cfg(feature = "log_trace")]
    log::trace!("Features after {} trades: {}", past.len(), features);
    features
}

/// Seller's features: car type handed in current iteration and counts of past outcomes.
/// ```
/// use lemons_core::domain::{CarType, MarketView, OpenTrade};
/// use lemons_core::features::seller_features;
/// let view = MarketView::new(&[], OpenTrade::new(CarType::Peach));
/// let f = seller_features(&view);
/// assert_eq!(f.to_vec(), vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// ```
pub fn seller_features(view: &MarketView) -> Array1<f32>{
    features_with_context(view.current.car_type.as_f32(), view.past)
}

/// Buyer's features: price quoted in current iteration and counts of past outcomes.
/// Buyer never sees the car type of current iteration.
pub fn buyer_features(view: &MarketView) -> Result<Array1<f32>, GameError>{
    match view.current.price{
        Some(price) => Ok(features_with_context(price, view.past)),
        None => {
            #[cfg(feature = "log_error")]
            log::error!("Buyer features requested before price of {} was quoted", view.current.car_type);
            Err(GameError::PriceNotQuoted)
        }
    }
}

impl Role{
    /// Features of the view from the side of this role. Action slot is left zero.
    pub fn extract_features(&self, view: &MarketView) -> Result<Array1<f32>, GameError>{
        match self{
            Role::Seller => Ok(seller_features(view)),
            Role::Buyer => buyer_features(view),
        }
    }
}

#[cfg(test)]
mod tests{
    use crate::domain::{CarType, Decision, MarketView, OpenTrade, PriceLevel, Role, Trade};
    use crate::error::GameError;
    use crate::features::*;

    fn history() -> Vec<Trade>{
        vec![
            Trade::new(CarType::Lemon, 7.0, Decision::Bought),
            Trade::new(CarType::Lemon, 7.0, Decision::Bought),
            Trade::new(CarType::Lemon, 3.0, Decision::Declined),
            Trade::new(CarType::Peach, 11.0, Decision::Bought),
            Trade::new(CarType::Peach, 5.0, Decision::Declined),
            Trade::new(CarType::Peach, 6.0, Decision::Declined),
        ]
    }

    #[test]
    fn identical_width_for_roles(){
        let past = history();
        let view = MarketView::new(&past, OpenTrade::new(CarType::Lemon).with_price(4.0));
        let s = Role::Seller.extract_features(&view).unwrap();
        let b = Role::Buyer.extract_features(&view).unwrap();
        assert_eq!(s.len(), FEATURE_LEN);
        assert_eq!(b.len(), FEATURE_LEN);
        assert_eq!(s[CONTEXT_SLOT], 0.0);
        assert_eq!(b[CONTEXT_SLOT], 4.0);
        assert_eq!(s[ACTION_SLOT], 0.0);
        assert_eq!(b[ACTION_SLOT], 0.0);
    }

    #[test]
    fn counts_cover_whole_past(){
        let past = history();
        for k in 0..=past.len(){
            let view = MarketView::new(&past[..k], OpenTrade::new(CarType::Peach).with_price(9.0));
            let f = buyer_features(&view).unwrap();
            let sum: f32 = f.iter().skip(COUNTS_OFFSET).sum();
            assert_eq!(sum as usize, view.len() - 1);
        }
    }

    #[test]
    fn slot_order(){
        let counts = OutcomeCounts::from_trades(&history());
        assert_eq!(counts.to_slots(), [2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
        assert_eq!(counts.get(CarType::Peach, PriceLevel::Low, Decision::Declined), 1);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn buyer_needs_price(){
        let view = MarketView::new(&[], OpenTrade::new(CarType::Lemon));
        assert_eq!(buyer_features(&view), Err(GameError::PriceNotQuoted));
        assert!(Role::Seller.extract_features(&view).is_ok());
    }

    #[test]
    fn first_move_has_no_counts(){
        let view = MarketView::new(&[], OpenTrade::new(CarType::Lemon).with_price(2.0));
        let f = buyer_features(&view).unwrap();
        assert!(f.iter().skip(COUNTS_OFFSET).all(|c| *c == 0.0));
    }
}
