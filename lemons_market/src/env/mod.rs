mod pairing;

pub use pairing::*;
