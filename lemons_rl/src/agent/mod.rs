mod market_agent;
mod memory;
mod summary;

pub use market_agent::*;
pub use memory::*;
pub use summary::*;
