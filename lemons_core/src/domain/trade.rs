use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::domain::{CarType, Decision, PriceLevel};

/// Record of one completed iteration between seller and buyer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade{
    pub car_type: CarType,
    pub price: f32,
    pub decision: Decision,
}

impl Trade{
    pub fn new(car_type: CarType, price: f32, decision: Decision) -> Self{
        Self{car_type, price, decision}
    }

    pub fn price_level(&self) -> PriceLevel{
        PriceLevel::of(self.price)
    }

    pub fn is_trade(&self) -> bool{
        self.decision.is_bought()
    }
}

impl Display for Trade{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} for {} -> {:?}]", self.car_type, self.price, self.decision)
    }
}

/// Iteration currently being played. Car type is known from the start, price is known after
/// seller acted. Buyer's decision is never part of it - it closes the trade.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenTrade{
    pub car_type: CarType,
    pub price: Option<f32>,
}

impl OpenTrade{
    pub fn new(car_type: CarType) -> Self{
        Self{car_type, price: None}
    }

    pub fn with_price(mut self, price: f32) -> Self{
        self.price = Some(price);
        self
    }

    /// Closes trade with buyer's decision. Returns `None` when price was not quoted yet.
    pub fn close(self, decision: Decision) -> Option<Trade>{
        self.price.map(|price| Trade::new(self.car_type, price, decision))
    }
}

/// What agent observes at the moment of taking action: trades already completed in this game
/// with its counterpart and the currently open one.
#[derive(Copy, Clone, Debug)]
pub struct MarketView<'a>{
    pub past: &'a [Trade],
    pub current: OpenTrade,
}

impl<'a> MarketView<'a>{
    pub fn new(past: &'a [Trade], current: OpenTrade) -> Self{
        Self{past, current}
    }

    /// Number of iterations visible, including the current one.
    pub fn len(&self) -> usize{
        self.past.len() + 1
    }

    /// View always includes current iteration, so it is never empty.
    pub fn is_empty(&self) -> bool{
        false
    }

    pub fn is_first_move(&self) -> bool{
        self.past.is_empty()
    }
}
