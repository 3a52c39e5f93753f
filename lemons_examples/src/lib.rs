//! # lemons_examples
//! Command line experiments running [`lemons_market`] simulation.

/// Logger and simulation setup
pub mod setup;
/// Command line options
pub mod options;
