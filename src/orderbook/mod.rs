//! Order book: price-ordered resting orders per instrument.

pub mod book;
pub mod types;

pub use book::{AddResult, DepthLevel, DepthSnapshot, OrderBook};
pub use types::PriceLevel;
