//! # lemons_rl
//! Learning agents for the market for lemons built on data model from [`lemons_core`].
//!
//! Agent estimates expected discounted payoff of every candidate action with pluggable
//! [`ValueModel`](model::ValueModel), samples action from softmax over estimates and learns
//! from examples collected in past games.
//! ## Licence: MIT

/// Error types defined in this crate
pub mod error;
/// Value models: trait and pure Rust implementations
pub mod model;
/// Selection of action from predicted payoffs
pub mod policy;
/// Market agent, its game memory and training summaries
pub mod agent;
