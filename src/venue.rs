//! The exchange venue: one order book per instrument, phase-aware routing
//! between continuous and batch matching, and a capped trade history.

use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::MatchingError;
use crate::matching::{batch, continuous, MatchResult, MatchStatus};
use crate::models::order::Order;
use crate::models::trade::Trade;
use crate::orderbook::book::OrderBook;
use crate::phase::{ExecutionStyle, PhaseSource};

const TRADE_HISTORY_CAPACITY: usize = 10_000;

/// Ring buffer capping in-memory trade history per instrument.
struct TradeHistory {
    trades: VecDeque<Trade>,
}

impl TradeHistory {
    fn new() -> Self {
        Self {
            trades: VecDeque::new(),
        }
    }

    fn push_all(&mut self, trades: &[Trade]) {
        for trade in trades {
            if self.trades.len() == TRADE_HISTORY_CAPACITY {
                self.trades.pop_front();
            }
            self.trades.push_back(trade.clone());
        }
    }

    fn recent(&self, limit: usize) -> Vec<Trade> {
        self.trades.iter().rev().take(limit).cloned().collect()
    }
}

pub struct ExchangeVenue {
    books: DashMap<String, Arc<OrderBook>>,
    history: DashMap<String, RwLock<TradeHistory>>,
    phase_source: Arc<dyn PhaseSource>,
}

impl ExchangeVenue {
    pub fn new(phase_source: Arc<dyn PhaseSource>) -> Self {
        Self {
            books: DashMap::new(),
            history: DashMap::new(),
            phase_source,
        }
    }

    /// Register an instrument's book. Idempotent: calling it twice for the
    /// same instrument is a no-op on the second call.
    pub fn register_instrument(&self, instrument_id: impl Into<String>) {
        let instrument_id = instrument_id.into();
        self.books
            .entry(instrument_id.clone())
            .or_insert_with(|| Arc::new(OrderBook::new(instrument_id.clone())));
        self.history
            .entry(instrument_id)
            .or_insert_with(|| RwLock::new(TradeHistory::new()));
    }

    pub fn get_order_book(&self, instrument_id: &str) -> Option<Arc<OrderBook>> {
        self.books.get(instrument_id).map(|b| b.clone())
    }

    /// Every registered instrument id, for callers that need to act on the
    /// whole venue (the phase poller running the opening auction book by
    /// book).
    pub fn instrument_ids(&self) -> Vec<String> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Submit an order. Routes to continuous matching or simply rests the
    /// order (pre-open accumulation), depending on the current phase.
    /// Returns `MatchingError::UnknownInstrument` for an unregistered
    /// instrument and `MatchingError::MarketClosed` outside trading hours.
    pub fn submit_order(&self, order: Order, now: chrono::DateTime<chrono::Utc>) -> Result<MatchResult, MatchingError> {
        let book = self
            .books
            .get(&order.instrument_id)
            .map(|b| b.clone())
            .ok_or_else(|| MatchingError::UnknownInstrument(order.instrument_id.clone()))?;

        let phase = self.phase_source.phase_at(now);
        if !phase.allow_submit {
            return Err(MatchingError::MarketClosed);
        }

        let instrument_id = order.instrument_id.clone();
        let result = match phase.execution_style {
            ExecutionStyle::Continuous => {
                let result = continuous::match_continuous(&book, order);
                self.record_trades(&instrument_id, &result.fills);
                result
            }
            ExecutionStyle::Batch | ExecutionStyle::None => {
                let remaining = order.remaining_quantity;
                book.add_order(order);
                MatchResult {
                    fills: Vec::new(),
                    remaining_quantity: remaining,
                    status: MatchStatus::Accepted,
                }
            }
        };

        Ok(result)
    }

    pub fn cancel_order(
        &self,
        instrument_id: &str,
        order_id: Uuid,
        trader_id: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool, MatchingError> {
        let book = self
            .books
            .get(instrument_id)
            .map(|b| b.clone())
            .ok_or_else(|| MatchingError::UnknownInstrument(instrument_id.to_string()))?;

        let phase = self.phase_source.phase_at(now);
        if !phase.allow_cancel {
            return Err(MatchingError::MarketClosed);
        }

        Ok(book.cancel_order(order_id, trader_id))
    }

    /// Cancel every resting order across every instrument. Used at market
    /// close.
    pub fn cancel_all_orders(&self) {
        for entry in self.books.iter() {
            entry.value().clear();
        }
    }

    /// Run the opening auction for one instrument, re-resting survivors
    /// into the continuous book at their original arrival timestamp.
    pub fn execute_opening_auction(
        &self,
        instrument_id: &str,
        reference_price: Option<Decimal>,
        timestamp: i64,
    ) -> Result<Vec<Trade>, MatchingError> {
        let book = self
            .books
            .get(instrument_id)
            .map(|b| b.clone())
            .ok_or_else(|| MatchingError::UnknownInstrument(instrument_id.to_string()))?;

        let result = batch::run_opening_auction(&book, instrument_id, reference_price, timestamp);
        self.record_trades(instrument_id, &result.trades);
        Ok(result.trades)
    }

    pub fn get_trade_history(&self, instrument_id: &str, limit: usize) -> Vec<Trade> {
        self.history
            .get(instrument_id)
            .map(|h| h.read().recent(limit))
            .unwrap_or_default()
    }

    fn record_trades(&self, instrument_id: &str, trades: &[Trade]) {
        if trades.is_empty() {
            return;
        }
        if let Some(history) = self.history.get(instrument_id) {
            history.write().push_all(trades);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderType, Side};
    use crate::phase::AlwaysContinuous;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn venue() -> ExchangeVenue {
        let v = ExchangeVenue::new(Arc::new(AlwaysContinuous));
        v.register_instrument("SPX_4500_CALL");
        v
    }

    fn limit(trader: &str, side: Side, price: Decimal, qty: u64) -> Order {
        Order::new("SPX_4500_CALL", trader, side, OrderType::Limit, qty, Some(price), None, 0).unwrap()
    }

    #[test]
    fn unknown_instrument_is_rejected() {
        let v = venue();
        let order = Order::new("UNKNOWN", "TEAM_A", Side::Buy, OrderType::Limit, 1, Some(dec!(1)), None, 0).unwrap();
        let err = v.submit_order(order, Utc::now()).unwrap_err();
        assert!(matches!(err, MatchingError::UnknownInstrument(_)));
    }

    #[test]
    fn matched_trade_is_recorded_in_history() {
        let v = venue();
        v.submit_order(limit("TEAM_A", Side::Sell, dec!(5.25), 10), Utc::now()).unwrap();
        v.submit_order(limit("TEAM_B", Side::Buy, dec!(5.25), 10), Utc::now()).unwrap();

        let history = v.get_trade_history("SPX_4500_CALL", 10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity, 10);
    }

    #[test]
    fn instrument_ids_lists_every_registered_instrument() {
        let v = venue();
        v.register_instrument("SPX_4600_CALL");
        let mut ids = v.instrument_ids();
        ids.sort();
        assert_eq!(ids, vec!["SPX_4500_CALL", "SPX_4600_CALL"]);
    }

    #[test]
    fn cancel_all_clears_every_book() {
        let v = venue();
        v.submit_order(limit("TEAM_A", Side::Buy, dec!(5.00), 10), Utc::now()).unwrap();
        v.cancel_all_orders();

        let book = v.get_order_book("SPX_4500_CALL").unwrap();
        assert!(book.is_bid_empty());
    }
}
