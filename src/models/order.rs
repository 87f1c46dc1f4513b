//! Order model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Signed quantity delta this side contributes to a position: +qty for
    /// buys, -qty for sells.
    pub fn signed_delta(self, quantity: i64) -> i64 {
        match self {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Accepted,
    Partial,
    Filled,
    Rejected,
    Cancelled,
}

/// An order as it flows through validation, matching, and the book.
///
/// `order_id` is assigned by the venue on acceptance; callers only ever
/// observe the id returned from submission, never the order itself once it
/// rests in the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub client_order_id: Option<String>,
    pub instrument_id: String,
    pub trader_id: String,
    pub side: Side,
    pub quantity: u64,
    pub price: Option<Decimal>,
    pub order_type: OrderType,
    pub remaining_quantity: u64,
    pub timestamp: i64,
}

impl Order {
    /// Construct a new order, assigning a fresh id and validating the basic
    /// invariants: positive quantity, limit orders carry a price, market
    /// orders don't.
    pub fn new(
        instrument_id: impl Into<String>,
        trader_id: impl Into<String>,
        side: Side,
        order_type: OrderType,
        quantity: u64,
        price: Option<Decimal>,
        client_order_id: Option<String>,
        timestamp: i64,
    ) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity(
                "quantity must be positive".into(),
            ));
        }

        match (order_type, price) {
            (OrderType::Limit, None) => {
                return Err(ValidationError::InvalidPrice(
                    "limit orders must carry a price".into(),
                ))
            }
            (OrderType::Limit, Some(p)) if p <= Decimal::ZERO => {
                return Err(ValidationError::InvalidPrice(
                    "price must be positive".into(),
                ))
            }
            (OrderType::Market, Some(_)) => {
                return Err(ValidationError::InvalidPrice(
                    "market orders must not carry a price".into(),
                ))
            }
            _ => {}
        }

        Ok(Self {
            order_id: Uuid::new_v4(),
            client_order_id,
            instrument_id: instrument_id.into(),
            trader_id: trader_id.into(),
            side,
            quantity,
            price,
            order_type,
            remaining_quantity: quantity,
            timestamp,
        })
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }
}
