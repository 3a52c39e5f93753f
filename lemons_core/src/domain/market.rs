use std::fmt::{Display, Formatter};
use std::str::FromStr;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use crate::error::{GameError, LemonsError, SetupError};

/// Price separating genuine-looking offers from suspicious ones.
/// > Sellers handed a peach are not allowed to quote prices at or below this value.
pub const PRICE_THRESHOLD: f32 = 5.0;

/// Quality of car handed to seller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum CarType{
    /// Low quality car.
    Lemon,
    /// High quality car.
    Peach,
}

impl CarType{
    /// Numeric encoding used in features: lemon is `0`, peach is `1`.
    pub fn as_f32(&self) -> f32{
        match self{
            CarType::Lemon => 0.0,
            CarType::Peach => 1.0,
        }
    }

    pub fn is_peach(&self) -> bool{
        matches!(self, CarType::Peach)
    }
}

impl Display for CarType{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self{
            CarType::Lemon => write!(f, "lemon"),
            CarType::Peach => write!(f, "peach"),
        }
    }
}

/// Buyer's answer to quoted price.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Decision{
    Declined,
    Bought,
}

impl Decision{
    /// Numeric encoding: `0` for declined, `1` for bought.
    pub fn as_f32(&self) -> f32{
        match self{
            Decision::Declined => 0.0,
            Decision::Bought => 1.0,
        }
    }

    /// Decodes decision from strategy value. Only `0` and `1` are accepted.
    /// ```
    /// use lemons_core::domain::Decision;
    /// assert_eq!(Decision::try_from_value(1.0).unwrap(), Decision::Bought);
    /// assert!(Decision::try_from_value(0.5).is_err());
    /// ```
    pub fn try_from_value(value: f32) -> Result<Self, GameError>{
        if value == 0.0{
            Ok(Decision::Declined)
        } else if value == 1.0{
            Ok(Decision::Bought)
        } else {
            #[cfg(feature = "log_error")]
            log::error!("Illegal decision value: {value}");
            Err(GameError::IllegalDecision(value))
        }
    }

    pub fn is_bought(&self) -> bool{
        matches!(self, Decision::Bought)
    }
}

/// Classification of quoted price against [`PRICE_THRESHOLD`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum PriceLevel{
    /// Price at most [`PRICE_THRESHOLD`].
    Low,
    /// Price strictly above [`PRICE_THRESHOLD`].
    High,
}

impl PriceLevel{
    pub fn of(price: f32) -> Self{
        if price > PRICE_THRESHOLD{
            PriceLevel::High
        } else {
            PriceLevel::Low
        }
    }
}

/// Side of the market agent plays on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Role{
    Seller,
    Buyer,
}

impl Role{
    /// Column of payoff (and target) matrix belonging to this role.
    pub fn payoff_column(&self) -> usize{
        match self{
            Role::Seller => 0,
            Role::Buyer => 1,
        }
    }
}

impl Display for Role{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self{
            Role::Seller => write!(f, "seller"),
            Role::Buyer => write!(f, "buyer"),
        }
    }
}

impl FromStr for Role{
    type Err = LemonsError;

    /// Parses player type. Buyers are also known as customers.
    /// ```
    /// use lemons_core::domain::Role;
    /// assert_eq!("customer".parse::<Role>().unwrap(), Role::Buyer);
    /// assert!("auctioneer".parse::<Role>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str(){
            "seller" | "sellers" => Ok(Role::Seller),
            "buyer" | "buyers" | "customer" | "customers" => Ok(Role::Buyer),
            _ => Err(SetupError::UnknownPlayerType(s.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests{
    use crate::domain::{Decision, PriceLevel, Role};
    use crate::error::{LemonsError, SetupError};

    #[test]
    fn price_threshold_splits_levels(){
        assert_eq!(PriceLevel::of(5.0), PriceLevel::Low);
        assert_eq!(PriceLevel::of(4.0), PriceLevel::Low);
        assert_eq!(PriceLevel::of(5.5), PriceLevel::High);
        assert_eq!(PriceLevel::of(12.0), PriceLevel::High);
    }

    #[test]
    fn decision_rejects_non_binary(){
        assert_eq!(Decision::try_from_value(0.0), Ok(Decision::Declined));
        assert!(Decision::try_from_value(2.0).is_err());
        assert!(Decision::try_from_value(f32::NAN).is_err());
    }

    #[test]
    fn unknown_player_type(){
        let err = "dealer".parse::<Role>().unwrap_err();
        assert_eq!(err, LemonsError::Setup {source: SetupError::UnknownPlayerType("dealer".into())});
        assert_eq!("Seller".parse::<Role>().unwrap(), Role::Seller);
    }
}
