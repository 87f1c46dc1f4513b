//! Per-instrument order book: two price-ordered maps of FIFO queues.

use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

use super::types::PriceLevel;
use crate::models::order::{Order, Side};

/// Outcome of adding an order to the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddResult {
    Rested,
    Rejected(String),
}

/// A single level in a depth snapshot: price and aggregated resting quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthLevel {
    pub price: Decimal,
    pub quantity: u64,
}

#[derive(Debug, Clone)]
pub struct DepthSnapshot {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

/// Per-instrument order book.
///
/// Bids are kept descending (highest first), asks ascending (lowest first).
/// Within a price level, orders are strict FIFO by arrival. An order index
/// gives O(1) cancellation without scanning every level.
pub struct OrderBook {
    instrument_id: String,
    bids: RwLock<BTreeMap<PriceLevel, VecDeque<Order>>>,
    asks: RwLock<BTreeMap<PriceLevel, VecDeque<Order>>>,
    index: DashMap<Uuid, (Side, PriceLevel)>,
}

impl OrderBook {
    pub fn new(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            bids: RwLock::new(BTreeMap::new()),
            asks: RwLock::new(BTreeMap::new()),
            index: DashMap::new(),
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    fn side_map(&self, side: Side) -> &RwLock<BTreeMap<PriceLevel, VecDeque<Order>>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Rest a limit order on its side of the book. Callers are expected to
    /// have already validated the order; market orders should never be
    /// passed here since they must never rest.
    pub fn add_order(&self, order: Order) -> AddResult {
        let Some(price) = order.price else {
            return AddResult::Rejected("market orders cannot rest".into());
        };
        let level = PriceLevel::from_decimal(price);
        let order_id = order.order_id;
        let side = order.side;

        self.side_map(side)
            .write()
            .entry(level)
            .or_default()
            .push_back(order);
        self.index.insert(order_id, (side, level));

        AddResult::Rested
    }

    /// Cancel a resting order. Fails (returns false) if the order doesn't
    /// exist or `trader_id` doesn't match the owner — cancellation by a
    /// non-owner must not succeed.
    pub fn cancel_order(&self, order_id: Uuid, trader_id: &str) -> bool {
        let Some(entry) = self.index.get(&order_id) else {
            return false;
        };
        let (side, level) = *entry;
        drop(entry);

        let mut book = self.side_map(side).write();
        let Some(queue) = book.get_mut(&level) else {
            return false;
        };
        let Some(pos) = queue.iter().position(|o| o.order_id == order_id) else {
            return false;
        };
        if queue[pos].trader_id != trader_id {
            return false;
        }
        queue.remove(pos);
        if queue.is_empty() {
            book.remove(&level);
        }
        drop(book);
        self.index.remove(&order_id);
        true
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.read().keys().next_back().map(|p| p.to_decimal())
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.read().keys().next().map(|p| p.to_decimal())
    }

    pub fn has_order(&self, order_id: Uuid) -> bool {
        self.index.contains_key(&order_id)
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_bid_empty(&self) -> bool {
        self.bids.read().is_empty()
    }

    pub fn is_ask_empty(&self) -> bool {
        self.asks.read().is_empty()
    }

    /// Drop every resting order on both sides. Used on market close.
    pub fn clear(&self) {
        self.bids.write().clear();
        self.asks.write().clear();
        self.index.clear();
    }

    /// Take every resting order from one side, in ascending price order for
    /// asks or descending for bids, each level's orders in arrival order.
    /// Used by the opening auction to drain the book before re-inserting
    /// survivors.
    pub(crate) fn drain_side(&self, side: Side) -> Vec<Order> {
        let mut book = self.side_map(side).write();
        let levels: Vec<PriceLevel> = match side {
            Side::Buy => book.keys().rev().copied().collect(),
            Side::Sell => book.keys().copied().collect(),
        };
        let mut out = Vec::new();
        for level in levels {
            if let Some(mut queue) = book.remove(&level) {
                for o in queue.drain(..) {
                    self.index.remove(&o.order_id);
                    out.push(o);
                }
            }
        }
        out
    }

    /// Walk the side opposite `taker_side` in price priority, consuming up
    /// to `remaining` units. `limit_price` stops the walk once the level
    /// would no longer satisfy the taker's limit (`None` walks the whole
    /// book, for market orders). `on_fill` is called once per partial or
    /// full consumption of a resting order, before that order's remaining
    /// quantity is decremented, so it can read the maker's price and id.
    /// Exhausted resting orders are removed from their queue and the index;
    /// emptied levels are removed from the map. Returns the taker's
    /// remaining quantity after the walk.
    pub(crate) fn match_opposite(
        &self,
        taker_side: Side,
        mut remaining: u64,
        limit_price: Option<Decimal>,
        mut on_fill: impl FnMut(&Order, u64),
    ) -> u64 {
        let opposite = taker_side.opposite();
        let mut book = self.side_map(opposite).write();

        let levels: Vec<PriceLevel> = match taker_side {
            Side::Buy => book.keys().copied().collect(),
            Side::Sell => book.keys().rev().copied().collect(),
        };

        for level in levels {
            if remaining == 0 {
                break;
            }
            if let Some(limit) = limit_price {
                let level_price = level.to_decimal();
                match taker_side {
                    Side::Buy if level_price > limit => break,
                    Side::Sell if level_price < limit => break,
                    _ => {}
                }
            }

            let Some(queue) = book.get_mut(&level) else {
                continue;
            };
            while remaining > 0 {
                let Some(maker) = queue.front_mut() else {
                    break;
                };
                let qty = remaining.min(maker.remaining_quantity);
                on_fill(maker, qty);
                maker.remaining_quantity -= qty;
                remaining -= qty;
                if maker.remaining_quantity == 0 {
                    let maker_id = queue.pop_front().unwrap().order_id;
                    self.index.remove(&maker_id);
                }
            }
            if queue.is_empty() {
                book.remove(&level);
            }
        }

        remaining
    }

    pub fn depth_snapshot(&self, max_levels: usize) -> DepthSnapshot {
        let bids = self
            .bids
            .read()
            .iter()
            .rev()
            .take(max_levels)
            .map(|(level, q)| DepthLevel {
                price: level.to_decimal(),
                quantity: q.iter().map(|o| o.remaining_quantity).sum(),
            })
            .collect();

        let asks = self
            .asks
            .read()
            .iter()
            .take(max_levels)
            .map(|(level, q)| DepthLevel {
                price: level.to_decimal(),
                quantity: q.iter().map(|o| o.remaining_quantity).sum(),
            })
            .collect();

        DepthSnapshot { bids, asks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderType;
    use rust_decimal_macros::dec;

    fn limit_order(trader: &str, side: Side, price: Decimal, qty: u64) -> Order {
        Order::new("SPX_4500_CALL", trader, side, OrderType::Limit, qty, Some(price), None, 0).unwrap()
    }

    #[test]
    fn add_and_cancel_round_trip() {
        let book = OrderBook::new("SPX_4500_CALL");
        let order = limit_order("TEAM_A", Side::Buy, dec!(5.25), 10);
        let id = order.order_id;

        assert_eq!(book.add_order(order), AddResult::Rested);
        assert!(book.has_order(id));

        assert!(book.cancel_order(id, "TEAM_A"));
        assert!(!book.has_order(id));
    }

    #[test]
    fn cancel_by_non_owner_fails() {
        let book = OrderBook::new("SPX_4500_CALL");
        let order = limit_order("TEAM_A", Side::Buy, dec!(5.25), 10);
        let id = order.order_id;
        book.add_order(order);

        assert!(!book.cancel_order(id, "TEAM_B"));
        assert!(book.has_order(id));
    }

    #[test]
    fn best_bid_ask_track_extremes() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit_order("TEAM_A", Side::Buy, dec!(5.00), 10));
        book.add_order(limit_order("TEAM_A", Side::Buy, dec!(5.25), 10));
        book.add_order(limit_order("TEAM_B", Side::Sell, dec!(5.50), 10));
        book.add_order(limit_order("TEAM_B", Side::Sell, dec!(5.75), 10));

        assert_eq!(book.best_bid(), Some(dec!(5.25)));
        assert_eq!(book.best_ask(), Some(dec!(5.50)));
    }

    #[test]
    fn depth_snapshot_aggregates_by_level() {
        let book = OrderBook::new("SPX_4500_CALL");
        book.add_order(limit_order("TEAM_A", Side::Buy, dec!(5.25), 10));
        book.add_order(limit_order("TEAM_B", Side::Buy, dec!(5.25), 5));

        let snapshot = book.depth_snapshot(10);
        assert_eq!(snapshot.bids.len(), 1);
        assert_eq!(snapshot.bids[0].quantity, 15);
    }
}
