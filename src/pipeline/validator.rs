//! Validator stage: constraint checks, then forward or reject.

use std::sync::Arc;

use chrono::Utc;

use super::queue::{recv_until_shutdown, QueueReceiver, QueueSender};
use crate::api::{MatcherItem, ValidatorItem};
use crate::positions::PositionStore;
use crate::response::{CompletionResult, ResponseCoordinator};
use crate::validation::{ConstraintValidator, ValidationContext, ValidationStatus};

pub fn run(
    receiver: QueueReceiver<ValidatorItem>,
    matcher_queue: QueueSender<MatcherItem>,
    validator: Arc<ConstraintValidator>,
    positions: Arc<PositionStore>,
    coordinator: Arc<ResponseCoordinator>,
) {
    while let Some(item) = recv_until_shutdown(&receiver) {
        let now = Utc::now().timestamp();
        let current_position = positions.get(&item.team.team_id, &item.order.instrument_id);
        let ctx = ValidationContext {
            order: &item.order,
            trader_id: &item.team.team_id,
            trader_role: &item.team.role,
            current_position,
        };
        let result = validator.validate(&ctx, now);

        match result.status {
            ValidationStatus::Rejected => {
                tracing::info!(
                    request_id = %item.request_id,
                    team_id = %item.team.team_id,
                    error_code = ?result.error_code,
                    "order rejected by validator"
                );
                coordinator.notify_completion(
                    item.request_id,
                    CompletionResult::Error {
                        code: result.error_code.unwrap_or_default(),
                        message: result.error_message.unwrap_or_default(),
                    },
                );
            }
            ValidationStatus::Accepted => {
                tracing::debug!(request_id = %item.request_id, "order accepted by validator");
                let _ = matcher_queue.send(MatcherItem {
                    order: item.order,
                    team: item.team,
                    request_id: item.request_id,
                });
            }
        }
    }
    tracing::info!("validator stage shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{Order, OrderType, Side};
    use crate::models::team::TeamInfo;
    use crate::pipeline::queue::bounded_queue;
    use crate::validation::Constraint;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn rejected_order_notifies_coordinator_without_forwarding() {
        let (matcher_sender, matcher_receiver) = bounded_queue::<MatcherItem>(4);
        let validator = Arc::new(ConstraintValidator::new());
        validator
            .load_constraints(
                "market_maker",
                vec![Constraint::InstrumentAllowed {
                    allowed_instruments: vec!["OTHER".into()],
                    error_code: "INVALID_INSTRUMENT".into(),
                    error_message: "not allowed".into(),
                }],
            )
            .unwrap();
        let positions = Arc::new(PositionStore::new());
        let coordinator = Arc::new(ResponseCoordinator::new(10));

        let (validator_sender, validator_receiver) = bounded_queue::<ValidatorItem>(4);
        let order = Order::new("SPX_4500_CALL", "TEAM_A", Side::Buy, OrderType::Limit, 10, Some(dec!(5.25)), None, 0).unwrap();
        let team = TeamInfo::new("TEAM_A", "Alpha", "market_maker");
        let registration_id = {
            let registration = coordinator.register(&team.team_id).unwrap();
            registration.request_id
        };
        validator_sender
            .send(ValidatorItem {
                order,
                team,
                request_id: registration_id,
            })
            .unwrap();
        validator_sender.shutdown();

        run(validator_receiver, matcher_sender, validator, positions, coordinator.clone());

        assert!(matcher_receiver.try_recv().is_err());
        let result = coordinator.wait_for_completion(registration_id, Duration::from_millis(50));
        assert!(matches!(result, CompletionResult::Error { .. }));
    }
}
