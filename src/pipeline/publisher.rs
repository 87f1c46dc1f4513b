//! Publisher stage: turns a fill into fee-annotated outbound messages and
//! fans the resulting position deltas out to the position tracker.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use super::queue::{recv_until_shutdown, QueueReceiver, QueueSender};
use crate::api::{PositionDelta, TradeEvent, WsMessage};
use crate::fees::{liquidity_type, FeeEngine};
use crate::models::order::Side;

struct Counterparty<'a> {
    team_id: &'a str,
    role: &'a str,
    side: Side,
}

pub fn run(
    receiver: QueueReceiver<TradeEvent>,
    position_queue: QueueSender<PositionDelta>,
    outbound_queue: QueueSender<WsMessage>,
    fees: Arc<FeeEngine>,
) {
    while let Some(event) = recv_until_shutdown(&receiver) {
        let trade = &event.trade;
        let counterparties = [
            Counterparty {
                team_id: &trade.buyer_id,
                role: &event.buyer_role,
                side: Side::Buy,
            },
            Counterparty {
                team_id: &trade.seller_id,
                role: &event.seller_role,
                side: Side::Sell,
            },
        ];

        for party in counterparties {
            let _ = position_queue.send(PositionDelta {
                team_id: party.team_id.to_string(),
                instrument_id: trade.instrument_id.clone(),
                signed_delta: party.side.signed_delta(trade.quantity as i64),
            });

            let liquidity = liquidity_type(party.side, event.aggressor_side);
            let fee = match fees.fee(trade.quantity, party.role, liquidity) {
                Ok(fee) => fee,
                Err(err) => {
                    tracing::warn!(team_id = party.team_id, role = party.role, error = %err, "fee lookup failed, reporting zero fee");
                    Decimal::ZERO
                }
            };

            let _ = outbound_queue.send(WsMessage {
                team_id: party.team_id.to_string(),
                payload: json!({
                    "type": "trade_execution",
                    "trade_id": trade.trade_id,
                    "instrument_id": trade.instrument_id,
                    "side": party.side,
                    "price": trade.price,
                    "quantity": trade.quantity,
                    "fee": fee,
                }),
            });
        }

        tracing::debug!(trade_id = %trade.trade_id, "trade published");
    }
    tracing::info!("publisher stage shutting down");
}
