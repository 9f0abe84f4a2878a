//! Data models shared across the library.

mod coin;

pub use coin::{Coin, Roi};
