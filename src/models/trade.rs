//! Trade records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::Side;

/// An executed trade. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: Uuid,
    pub instrument_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub buyer_order_id: Uuid,
    pub seller_order_id: Uuid,
    pub price: Decimal,
    pub quantity: u64,
    pub timestamp: i64,
    /// Side of the order that initiated the match. For auction trades there
    /// is no true aggressor; it is set to the side holding the larger
    /// qualifying volume (the side being rationed at the margin).
    pub aggressor_side: Side,
}

impl Trade {
    pub fn value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn value_is_price_times_quantity() {
        let trade = Trade {
            trade_id: Uuid::new_v4(),
            instrument_id: "SPX_4500_CALL".into(),
            buyer_id: "TEAM_A".into(),
            seller_id: "TEAM_B".into(),
            buyer_order_id: Uuid::new_v4(),
            seller_order_id: Uuid::new_v4(),
            price: dec!(5.25),
            quantity: 5,
            timestamp: 0,
            aggressor_side: Side::Sell,
        };
        assert_eq!(trade.value(), dec!(26.25));
    }
}
