//! Batch (opening auction) matching.
//!
//! Orders accumulate in the book without matching while the market is in
//! its pre-open phase. At the open, this module computes a single clearing
//! price that maximizes executable volume, matches every order that
//! qualifies at that price, and re-rests (or cancels) whatever's left.
//! Strict price/arrival priority governs everything except the marginal
//! price level, where execution order is randomized to give resting orders
//! a fair share when the book can't clear every order at the margin.

use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::order::{Order, OrderType, Side};
use crate::models::trade::Trade;
use crate::orderbook::book::OrderBook;

#[derive(Debug, Clone)]
pub struct AuctionResult {
    pub trades: Vec<Trade>,
    pub clearing_price: Option<Decimal>,
}

/// Does this resting order qualify to trade at `clearing` on `side`? Market
/// orders have no limit and always qualify.
fn qualifies(order: &Order, side: Side, clearing: Decimal) -> bool {
    match (side, order.price) {
        (_, None) => true,
        (Side::Buy, Some(p)) => p >= clearing,
        (Side::Sell, Some(p)) => p <= clearing,
    }
}

fn qualifying_volume(orders: &[Order], side: Side, candidate: Decimal) -> u64 {
    orders
        .iter()
        .filter(|o| qualifies(o, side, candidate))
        .map(|o| o.remaining_quantity)
        .sum()
}

/// Pick the clearing price: the candidate maximizing executable volume,
/// tie-broken toward `reference` when available, else toward the midpoint
/// of the tying candidates (rounded down to the nearest quoted price when
/// the exact midpoint isn't quoted).
fn clearing_price(
    bids: &[Order],
    asks: &[Order],
    reference: Option<Decimal>,
) -> Option<Decimal> {
    let mut candidates: HashSet<Decimal> = HashSet::new();
    candidates.extend(bids.iter().filter_map(|o| o.price));
    candidates.extend(asks.iter().filter_map(|o| o.price));
    if candidates.is_empty() {
        return reference;
    }
    let mut candidates: Vec<Decimal> = candidates.into_iter().collect();
    candidates.sort();

    let mut best_volume = 0u64;
    let mut tying = Vec::new();
    for &p in &candidates {
        let volume = qualifying_volume(bids, Side::Buy, p).min(qualifying_volume(asks, Side::Sell, p));
        match volume.cmp(&best_volume) {
            std::cmp::Ordering::Greater => {
                best_volume = volume;
                tying = vec![p];
            }
            std::cmp::Ordering::Equal if volume > 0 => tying.push(p),
            _ => {}
        }
    }
    if tying.is_empty() {
        return None;
    }

    Some(if let Some(reference) = reference {
        *tying
            .iter()
            .min_by_key(|&&p| (p - reference).abs())
            .unwrap()
    } else {
        let lo = *tying.first().unwrap();
        let hi = *tying.last().unwrap();
        let midpoint = (lo + hi) / Decimal::from(2);
        tying
            .iter()
            .find(|&&p| p == midpoint)
            .copied()
            .or_else(|| tying.iter().rev().find(|&&p| p <= midpoint).copied())
            .unwrap_or(lo)
    })
}

/// Shuffle the contiguous run of orders priced exactly at `clearing` within
/// an already price/arrival-ordered list, leaving orders priced better than
/// the clearing price (which always fully execute) in their original order.
fn randomize_margin(mut orders: Vec<Order>, clearing: Decimal) -> Vec<Order> {
    let margin_indices: Vec<usize> = orders
        .iter()
        .enumerate()
        .filter(|(_, o)| o.price == Some(clearing))
        .map(|(i, _)| i)
        .collect();
    if margin_indices.len() > 1 {
        let mut margin_orders: Vec<Order> = margin_indices.iter().map(|&i| orders[i].clone()).collect();
        margin_orders.shuffle(&mut rand::thread_rng());
        for (slot, order) in margin_indices.into_iter().zip(margin_orders) {
            orders[slot] = order;
        }
    }
    orders
}

/// Run the opening auction against `book`. Non-qualifying orders are
/// re-rested unchanged, preserving their original arrival timestamp.
/// Qualifying orders trade at the clearing price in priority order, with
/// the marginal price level randomized per side; any qualifying order left
/// with unfilled quantity rests if it's a limit order, or is dropped
/// (cancelled) if it's a market order.
pub fn run_opening_auction(
    book: &OrderBook,
    instrument_id: &str,
    reference_price: Option<Decimal>,
    timestamp: i64,
) -> AuctionResult {
    let bids = book.drain_side(Side::Buy);
    let asks = book.drain_side(Side::Sell);

    let Some(clearing) = clearing_price(&bids, &asks, reference_price) else {
        for order in bids.into_iter().chain(asks) {
            book.add_order(order);
        }
        return AuctionResult {
            trades: Vec::new(),
            clearing_price: None,
        };
    };

    let (qualifying_bids, rest_bids): (Vec<Order>, Vec<Order>) =
        bids.into_iter().partition(|o| qualifies(o, Side::Buy, clearing));
    let (qualifying_asks, rest_asks): (Vec<Order>, Vec<Order>) =
        asks.into_iter().partition(|o| qualifies(o, Side::Sell, clearing));

    for order in rest_bids.into_iter().chain(rest_asks) {
        book.add_order(order);
    }

    let bid_volume: u64 = qualifying_bids.iter().map(|o| o.remaining_quantity).sum();
    let ask_volume: u64 = qualifying_asks.iter().map(|o| o.remaining_quantity).sum();
    let rationed_side = if bid_volume >= ask_volume {
        Side::Buy
    } else {
        Side::Sell
    };

    let mut qualifying_bids = randomize_margin(qualifying_bids, clearing);
    let mut qualifying_asks = randomize_margin(qualifying_asks, clearing);

    let mut trades = Vec::new();
    let mut bi = 0;
    let mut ai = 0;
    while bi < qualifying_bids.len() && ai < qualifying_asks.len() {
        let qty = qualifying_bids[bi]
            .remaining_quantity
            .min(qualifying_asks[ai].remaining_quantity);
        trades.push(Trade {
            trade_id: Uuid::new_v4(),
            instrument_id: instrument_id.to_string(),
            buyer_id: qualifying_bids[bi].trader_id.clone(),
            seller_id: qualifying_asks[ai].trader_id.clone(),
            buyer_order_id: qualifying_bids[bi].order_id,
            seller_order_id: qualifying_asks[ai].order_id,
            price: clearing,
            quantity: qty,
            timestamp,
            aggressor_side: rationed_side,
        });
        qualifying_bids[bi].remaining_quantity -= qty;
        qualifying_asks[ai].remaining_quantity -= qty;
        if qualifying_bids[bi].remaining_quantity == 0 {
            bi += 1;
        }
        if qualifying_asks[ai].remaining_quantity == 0 {
            ai += 1;
        }
    }

    for order in qualifying_bids
        .into_iter()
        .skip(bi)
        .chain(qualifying_asks.into_iter().skip(ai))
    {
        if order.remaining_quantity == 0 {
            continue;
        }
        if order.order_type == OrderType::Limit {
            book.add_order(order);
        }
    }

    AuctionResult {
        trades,
        clearing_price: Some(clearing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limit(trader: &str, side: Side, price: Decimal, qty: u64) -> Order {
        Order::new("SPX_4500_CALL", trader, side, OrderType::Limit, qty, Some(price), None, 0).unwrap()
    }

    #[test]
    fn clears_crossing_orders_at_a_single_price() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Buy, dec!(5.50), 10));
        book.add_order(limit("TEAM_B", Side::Sell, dec!(5.00), 10));

        let result = run_opening_auction(&book, "SPX_4500_CALL", None, 0);
        assert!(result.clearing_price.is_some());
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].quantity, 10);
        let price = result.trades[0].price;
        assert!(price >= dec!(5.00) && price <= dec!(5.50));
    }

    #[test]
    fn non_crossing_orders_rest_unchanged() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Buy, dec!(4.00), 10));
        book.add_order(limit("TEAM_B", Side::Sell, dec!(6.00), 10));

        let result = run_opening_auction(&book, "SPX_4500_CALL", None, 0);
        assert!(result.trades.is_empty());
        assert_eq!(book.best_bid(), Some(dec!(4.00)));
        assert_eq!(book.best_ask(), Some(dec!(6.00)));
    }

    #[test]
    fn tie_break_prefers_price_closest_to_reference() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Buy, dec!(5.00), 10));
        book.add_order(limit("TEAM_B", Side::Sell, dec!(5.00), 10));

        let result = run_opening_auction(&book, "SPX_4500_CALL", Some(dec!(5.00)), 0);
        assert_eq!(result.clearing_price, Some(dec!(5.00)));
    }

    #[test]
    fn rationed_side_retains_unmatched_remainder() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Buy, dec!(5.00), 20));
        book.add_order(limit("TEAM_B", Side::Sell, dec!(5.00), 10));

        let result = run_opening_auction(&book, "SPX_4500_CALL", None, 0);
        assert_eq!(result.trades.iter().map(|t| t.quantity).sum::<u64>(), 10);
        assert_eq!(book.best_bid(), Some(dec!(5.00)));
    }

    #[test]
    fn empty_side_produces_no_clearing_price() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit("TEAM_A", Side::Buy, dec!(5.00), 10));

        let result = run_opening_auction(&book, "SPX_4500_CALL", None, 0);
        assert_eq!(result.clearing_price, None);
        assert!(result.trades.is_empty());
        assert_eq!(book.best_bid(), Some(dec!(5.00)));
    }
}
