//! Matcher stage: asks the venue to process the order, notifies the
//! coordinator immediately, and fans fills out to the publisher queue.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use super::queue::{recv_until_shutdown, QueueReceiver, QueueSender};
use crate::api::{MatcherItem, TradeEvent};
use crate::matching::MatchStatus;
use crate::models::team::TeamDirectory;
use crate::response::{CompletionResult, ResponseCoordinator};
use crate::venue::ExchangeVenue;

fn status_str(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Filled => "filled",
        MatchStatus::Partial => "partial",
        MatchStatus::Accepted => "accepted",
        MatchStatus::Rejected => "rejected",
    }
}

pub fn run(
    receiver: QueueReceiver<MatcherItem>,
    publisher_queue: QueueSender<TradeEvent>,
    venue: Arc<ExchangeVenue>,
    teams: Arc<TeamDirectory>,
    coordinator: Arc<ResponseCoordinator>,
) {
    while let Some(item) = recv_until_shutdown(&receiver) {
        let order_id = item.order.order_id;
        let submitter_id = item.team.team_id.clone();
        let submitter_role = item.team.role.clone();

        match venue.submit_order(item.order, Utc::now()) {
            Ok(result) => {
                tracing::info!(
                    request_id = %item.request_id,
                    order_id = %order_id,
                    status = status_str(result.status),
                    fill_count = result.fills.len(),
                    "order processed by venue"
                );
                coordinator.notify_completion(
                    item.request_id,
                    CompletionResult::Success(json!({
                        "order_id": order_id,
                        "status": status_str(result.status),
                        "fill_count": result.fills.len(),
                    })),
                );

                for trade in result.fills {
                    let buyer_role = if trade.buyer_id == submitter_id {
                        submitter_role.clone()
                    } else {
                        teams.role_of(&trade.buyer_id)
                    };
                    let seller_role = if trade.seller_id == submitter_id {
                        submitter_role.clone()
                    } else {
                        teams.role_of(&trade.seller_id)
                    };
                    let aggressor_side = trade.aggressor_side;
                    let _ = publisher_queue.send(TradeEvent {
                        trade,
                        buyer_role,
                        seller_role,
                        aggressor_side,
                    });
                }
            }
            Err(err) => {
                tracing::warn!(request_id = %item.request_id, order_id = %order_id, error = %err, "order rejected by venue");
                coordinator.notify_completion(
                    item.request_id,
                    CompletionResult::Error {
                        code: err.code().as_str().to_string(),
                        message: err.to_string(),
                    },
                );
            }
        }
    }
    tracing::info!("matcher stage shutting down");
}
