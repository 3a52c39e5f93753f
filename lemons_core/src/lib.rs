//! # lemons_core
//!
//!
//! Core data model of the repeated _market for lemons_ game.
//! In every iteration of the game a seller is handed a car (a _lemon_ or a _peach_), quotes
//! a price and the paired buyer decides whether to buy it without seeing the car.
//!
//! This crate provides the pieces that do not depend on any learning machinery:
//! 1. Trade records and the view agents have on the game ([`domain`]),
//! 2. Payoffs of finished trades, computed over whole trajectories at once ([`payoff`]),
//! 3. Discounted multi-step targets used for credit assignment ([`target`]),
//! 4. Feature vectors describing candidate action and past outcomes ([`features`]).
//!
//! ## Licence: MIT

/// Trade records, car types, decisions and roles.
pub mod domain;
/// Structures used for error handling in the workspace.
pub mod error;
/// Payoffs of trades (reward model).
pub mod payoff;
/// Discounted return targets computed from trajectories.
pub mod target;
/// Feature extraction for sellers and buyers.
pub mod features;
