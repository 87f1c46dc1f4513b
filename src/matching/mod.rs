//! Matching engines: continuous price/time priority and batch (opening
//! auction). Both consume one order plus a book and return `MatchResult`;
//! neither touches positions or emits side-effects beyond trades and book
//! mutation.

pub mod batch;
pub mod continuous;

use serde::{Deserialize, Serialize};

use crate::models::trade::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Filled,
    Partial,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub fills: Vec<Trade>,
    pub remaining_quantity: u64,
    pub status: MatchStatus,
}

pub use batch::{run_opening_auction, AuctionResult};
pub use continuous::match_continuous;
