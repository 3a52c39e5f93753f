//! # lemons_market
//! Repeated _market for lemons_ played by learning agents from [`lemons_rl`].
//!
//! In every game sellers are randomly paired with buyers. Each pair plays fixed number of
//! iterations: seller is handed a car drawn from configured distribution and quotes a price,
//! then buyer (who does not see the car) decides whether to buy. After a batch of games
//! every agent refits its value model on examples from the most recent games.
//! ## Licence: MIT

/// Configuration of simulation
pub mod config;
/// Generation of seller-buyer pairings
pub mod env;
/// Game engine driving agents through iterations
pub mod game;
/// Alternating play and fitting rounds
pub mod simulation;
/// Statistics of played games
pub mod stats;
