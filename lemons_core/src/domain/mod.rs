mod market;
mod trade;

pub use market::*;
pub use trade::*;
