mod lemons;
mod setup;
mod game;
mod data;
mod learning;

pub use lemons::*;
pub use setup::*;
pub use game::*;
pub use data::*;
pub use learning::*;
