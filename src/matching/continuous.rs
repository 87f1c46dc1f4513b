//! Continuous (price/time priority) matching.

use uuid::Uuid;

use super::{MatchResult, MatchStatus};
use crate::models::order::{Order, OrderType, Side};
use crate::models::trade::Trade;
use crate::orderbook::book::OrderBook;

/// Match an incoming order against the opposite side of `book`. Limit orders
/// that aren't fully filled rest; market orders never rest, and any
/// unfilled remainder is simply dropped. Self-trading (taker and resting
/// maker share a trader id) is allowed and produces a trade like any other.
pub fn match_continuous(book: &OrderBook, mut incoming: Order) -> MatchResult {
    let limit_price = match incoming.order_type {
        OrderType::Limit => incoming.price,
        OrderType::Market => None,
    };

    let mut fills = Vec::new();
    let instrument_id = incoming.instrument_id.clone();
    let incoming_id = incoming.order_id;
    let incoming_trader = incoming.trader_id.clone();
    let incoming_side = incoming.side;
    let timestamp = incoming.timestamp;

    let remaining = book.match_opposite(
        incoming_side,
        incoming.remaining_quantity,
        limit_price,
        |maker, qty| {
            let price = maker
                .price
                .expect("resting orders always carry a price");
            let (buyer_id, seller_id, buyer_order_id, seller_order_id) = match incoming_side {
                Side::Buy => (
                    incoming_trader.clone(),
                    maker.trader_id.clone(),
                    incoming_id,
                    maker.order_id,
                ),
                Side::Sell => (
                    maker.trader_id.clone(),
                    incoming_trader.clone(),
                    maker.order_id,
                    incoming_id,
                ),
            };
            fills.push(Trade {
                trade_id: Uuid::new_v4(),
                instrument_id: instrument_id.clone(),
                buyer_id,
                seller_id,
                buyer_order_id,
                seller_order_id,
                price,
                quantity: qty,
                timestamp,
                aggressor_side: incoming_side,
            });
        },
    );
    incoming.remaining_quantity = remaining;

    let status = if remaining == 0 {
        MatchStatus::Filled
    } else {
        match incoming.order_type {
            OrderType::Limit => {
                let status = if fills.is_empty() {
                    MatchStatus::Accepted
                } else {
                    MatchStatus::Partial
                };
                book.add_order(incoming);
                status
            }
            OrderType::Market => {
                if fills.is_empty() {
                    MatchStatus::Rejected
                } else {
                    MatchStatus::Partial
                }
            }
        }
    };

    MatchResult {
        fills,
        remaining_quantity: remaining,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderType;
    use rust_decimal_macros::dec;

    fn limit(trader: &str, side: Side, price: rust_decimal::Decimal, qty: u64) -> Order {
        Order::new("SPX_4500_CALL", trader, side, OrderType::Limit, qty, Some(price), None, 0).unwrap()
    }

    fn market(trader: &str, side: Side, qty: u64) -> Order {
        Order::new("SPX_4500_CALL", trader, side, OrderType::Market, qty, None, None, 1).unwrap()
    }

    #[test]
    fn resting_limit_trades_at_maker_price() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Sell, dec!(5.25), 10));

        let result = match_continuous(&book, limit("TEAM_B", Side::Buy, dec!(5.50), 10));
        assert_eq!(result.status, MatchStatus::Filled);
        assert_eq!(result.fills.len(), 1);
        assert_eq!(result.fills[0].price, dec!(5.25));
        assert_eq!(result.fills[0].aggressor_side, Side::Buy);
    }

    #[test]
    fn partial_limit_fill_rests_remainder() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Sell, dec!(5.25), 4));

        let result = match_continuous(&book, limit("TEAM_B", Side::Buy, dec!(5.25), 10));
        assert_eq!(result.status, MatchStatus::Partial);
        assert_eq!(result.remaining_quantity, 6);
        assert_eq!(book.best_bid(), Some(dec!(5.25)));
    }

    #[test]
    fn unfilled_market_order_is_rejected() {
        let book = OrderBook::new("SPX_4500_CALL");
        let result = match_continuous(&book, market("TEAM_B", Side::Buy, 10));
        assert_eq!(result.status, MatchStatus::Rejected);
        assert_eq!(result.remaining_quantity, 10);
        assert!(book.is_bid_empty());
    }

    #[test]
    fn partially_filled_market_order_does_not_rest() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Sell, dec!(5.25), 3));

        let result = match_continuous(&book, market("TEAM_B", Side::Buy, 10));
        assert_eq!(result.status, MatchStatus::Partial);
        assert_eq!(result.remaining_quantity, 7);
        assert!(book.is_bid_empty());
    }

    #[test]
    fn self_trade_is_allowed() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Sell, dec!(5.25), 10));

        let result = match_continuous(&book, limit("TEAM_A", Side::Buy, dec!(5.25), 10));
        assert_eq!(result.status, MatchStatus::Filled);
        assert_eq!(result.fills[0].buyer_id, "TEAM_A");
        assert_eq!(result.fills[0].seller_id, "TEAM_A");
    }

    #[test]
    fn limit_order_walks_multiple_levels() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Sell, dec!(5.00), 5));
        book.add_order(limit("TEAM_B", Side::Sell, dec!(5.10), 5));

        let result = match_continuous(&book, limit("TEAM_C", Side::Buy, dec!(5.10), 10));
        assert_eq!(result.status, MatchStatus::Filled);
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.fills[0].price, dec!(5.00));
        assert_eq!(result.fills[1].price, dec!(5.10));
    }
}
