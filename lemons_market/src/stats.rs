use enum_map::{enum_map, EnumMap};
use getset::CopyGetters;
use serde::{Deserialize, Serialize};
use lemons_core::domain::{CarType, PriceLevel, Role, Trade};
use lemons_core::error::{GameError, LemonsError};
use lemons_core::payoff::PayoffTable;
use crate::game::GameLog;

/// Number of iterations that ended with a trade.
pub fn count_trades(trades: &[Trade]) -> usize{
    trades.iter().filter(|t| t.is_trade()).count()
}

fn fraction(selected: usize, of: usize) -> f64{
    match of{
        0 => 0.0,
        n => selected as f64 / n as f64
    }
}

/// Share of lemons offered at low price. `0` when there were no lemons.
pub fn honest_fraction(trades: &[Trade]) -> f64{
    let lemons: Vec<&Trade> = trades.iter().filter(|t| t.car_type == CarType::Lemon).collect();
    let honest = lemons.iter().filter(|t| t.price_level() == PriceLevel::Low).count();
    fraction(honest, lemons.len())
}

/// Share of high priced offers that were bought. `0` when there were no such offers.
pub fn trust_fraction(trades: &[Trade]) -> f64{
    let high: Vec<&Trade> = trades.iter().filter(|t| t.price_level() == PriceLevel::High).collect();
    let bought = high.iter().filter(|t| t.is_trade()).count();
    fraction(bought, high.len())
}

/// Sum of pure economic payoffs (no deception term) of given side.
pub fn total_payoff(trades: &[Trade], role: Role) -> f32{
    PayoffTable::default().payoffs(trades, 0.0).column(role.payoff_column()).sum()
}

/// Total payoff of player type named `"seller"` or `"customer"` (`"buyer"` is accepted too).
/// ```
/// use lemons_core::domain::{CarType, Decision, Trade};
/// use lemons_market::stats::award;
/// let trades = [Trade::new(CarType::Lemon, 7.0, Decision::Bought)];
/// assert_eq!(award(&trades, "seller").unwrap(), 6.0);
/// assert_eq!(award(&trades, "customer").unwrap(), -5.0);
/// assert!(award(&trades, "dealer").is_err());
/// ```
pub fn award(trades: &[Trade], player_type: &str) -> Result<f32, LemonsError>{
    let role: Role = player_type.parse()?;
    Ok(total_payoff(trades, role))
}

/// Statistics of single agent in single game.
#[derive(Debug, Copy, Clone, PartialEq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct AgentGameStats{
    trades: usize,
    honest_fraction: f64,
    trust_fraction: f64,
    payoff: f32,
}

impl AgentGameStats{
    pub fn of(trades: &[Trade], role: Role) -> Self{
        Self{
            trades: count_trades(trades),
            honest_fraction: honest_fraction(trades),
            trust_fraction: trust_fraction(trades),
            payoff: total_payoff(trades, role),
        }
    }
}

/// Statistics of every agent in every game, indexed `[role][agent][game]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStatistics{
    per_role: EnumMap<Role, Vec<Vec<AgentGameStats>>>,
}

/// Mean of statistics over agents and games.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsMean{
    pub trades: f64,
    pub honest_fraction: f64,
    pub trust_fraction: f64,
    pub payoff: f64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStatisticsMean{
    pub sellers: StatsMean,
    pub buyers: StatsMean,
}

impl MarketStatistics{

    /// Games of agent with given role and index.
    pub fn agent(&self, role: Role, agent: usize) -> Option<&[AgentGameStats]>{
        self.per_role[role].get(agent).map(|v| v.as_slice())
    }

    pub fn role(&self, role: Role) -> &[Vec<AgentGameStats>]{
        &self.per_role[role]
    }

    fn role_mean(&self, role: Role) -> StatsMean{
        let all: Vec<&AgentGameStats> = self.per_role[role].iter().flatten().collect();
        if all.is_empty(){
            return StatsMean::default();
        }
        let n = all.len() as f64;
        StatsMean{
            trades: all.iter().map(|s| s.trades as f64).sum::<f64>() / n,
            honest_fraction: all.iter().map(|s| s.honest_fraction).sum::<f64>() / n,
            trust_fraction: all.iter().map(|s| s.trust_fraction).sum::<f64>() / n,
            payoff: all.iter().map(|s| s.payoff as f64).sum::<f64>() / n,
        }
    }

    pub fn mean(&self) -> MarketStatisticsMean{
        MarketStatisticsMean{
            sellers: self.role_mean(Role::Seller),
            buyers: self.role_mean(Role::Buyer),
        }
    }
}

/// Computes statistics of every seller and buyer for every game in `logs`.
/// Every log must have exactly `n_pairs` pairs.
pub fn calculate_statistics(logs: &[GameLog], n_pairs: usize) -> Result<MarketStatistics, GameError>{
    let mut per_role: EnumMap<Role, Vec<Vec<AgentGameStats>>> = enum_map! {
        Role::Seller => vec![Vec::with_capacity(logs.len()); n_pairs],
        Role::Buyer => vec![Vec::with_capacity(logs.len()); n_pairs],
    };
    for log in logs{
        if log.n_pairs() != n_pairs{
            return Err(GameError::PairingSizeMismatch {table: log.n_pairs(), agents: n_pairs});
        }
        for (role, agents) in per_role.iter_mut(){
            for (idx, games) in agents.iter_mut().enumerate(){
                let trajectory = log.trajectory_of(role, idx)
                    .ok_or(GameError::PairingNotBijective {pairs: n_pairs})?;
                games.push(AgentGameStats::of(trajectory, role));
            }
        }
    }
    Ok(MarketStatistics{per_role})
}
