//! External interface data shapes and pipeline queue item types.
//!
//! Nothing here binds to a transport: a future HTTP layer would deserialize
//! requests into these types and serialize `ApiResponse` back out, but this
//! crate only defines the shapes and the queue items that carry them
//! through the pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::order::{OrderType, Side};
use crate::models::trade::Trade;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOrder {
    pub team_id: String,
    pub instrument_id: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: u64,
    pub price: Option<Decimal>,
    pub client_order_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrder {
    pub team_id: String,
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryPositions {
    pub team_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub order_id: Option<Uuid>,
    pub data: Option<Value>,
    pub error: Option<ApiError>,
    pub timestamp: i64,
}

impl ApiResponse {
    pub fn success(request_id: Uuid, order_id: Option<Uuid>, data: Value, timestamp: i64) -> Self {
        ApiResponse {
            success: true,
            request_id,
            order_id,
            data: Some(data),
            error: None,
            timestamp,
        }
    }

    pub fn error(request_id: Uuid, code: impl Into<String>, message: impl Into<String>, timestamp: i64) -> Self {
        ApiResponse {
            success: false,
            request_id,
            order_id: None,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
                details: None,
            }),
            timestamp,
        }
    }
}

/// `(Order, TeamInfo, request_id)` carried from submission onto the
/// validator queue.
pub struct ValidatorItem {
    pub order: crate::models::order::Order,
    pub team: crate::models::team::TeamInfo,
    pub request_id: Uuid,
}

/// Same shape as `ValidatorItem`, forwarded by the validator stage once a
/// submission clears every constraint.
pub struct MatcherItem {
    pub order: crate::models::order::Order,
    pub team: crate::models::team::TeamInfo,
    pub request_id: Uuid,
}

/// Emitted by the matcher stage for each fill, carrying both
/// counterparties' roles so the publisher can look up fee schedules
/// without a second store lookup.
pub struct TradeEvent {
    pub trade: Trade,
    pub buyer_role: String,
    pub seller_role: String,
    pub aggressor_side: Side,
}

/// `(team_id, instrument_id, signed_delta)` pushed onto the
/// position-tracker queue.
pub struct PositionDelta {
    pub team_id: String,
    pub instrument_id: String,
    pub signed_delta: i64,
}

/// An outbound message handed to the WebSocket fan-out sink. The sink
/// itself (and the socket it drains into) is out of scope; this is the
/// item shape the publisher stage produces.
pub struct WsMessage {
    pub team_id: String,
    pub payload: Value,
}
