//! Role-based constraint validator: position limits, instrument whitelists,
//! and per-second order rate limits, checked in registration order with
//! first-failure short-circuiting.

pub mod rate;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::models::order::{Order, Side};
use rate::RateCounter;

/// One constraint registered against a role. `error_code`/`error_message`
/// are the values surfaced to the caller when the constraint is violated;
/// they let operators customize wording per role without touching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constraint {
    InstrumentAllowed {
        allowed_instruments: Vec<String>,
        error_code: String,
        error_message: String,
    },
    PositionLimit {
        max_position: i64,
        symmetric: bool,
        error_code: String,
        error_message: String,
    },
    OrderRate {
        max_orders_per_second: u32,
        error_code: String,
        error_message: String,
    },
}

/// Everything the validator needs to evaluate one submission. Constructed
/// fresh per submission; never persisted.
pub struct ValidationContext<'a> {
    pub order: &'a Order,
    pub trader_id: &'a str,
    pub trader_role: &'a str,
    pub current_position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn accepted() -> Self {
        ValidationResult {
            status: ValidationStatus::Accepted,
            error_code: None,
            error_message: None,
        }
    }

    pub fn rejected(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        ValidationResult {
            status: ValidationStatus::Rejected,
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
        }
    }
}

fn signed_delta(side: Side, quantity: u64) -> i64 {
    side.signed_delta(quantity as i64)
}

/// Role-indexed registry of constraints, plus the per-second rate counters
/// the `OrderRate` constraint needs.
pub struct ConstraintValidator {
    constraints: DashMap<String, Vec<Constraint>>,
    rate_counter: RateCounter,
}

impl ConstraintValidator {
    pub fn new() -> Self {
        Self {
            constraints: DashMap::new(),
            rate_counter: RateCounter::new(),
        }
    }

    /// Register the constraint list for a role, replacing any prior list.
    /// Rejects at load time (not validate time) if a constraint carries
    /// parameters this validator doesn't recognize as complete.
    pub fn load_constraints(
        &self,
        role: impl Into<String>,
        constraints: Vec<Constraint>,
    ) -> Result<(), ValidationError> {
        for constraint in &constraints {
            if let Constraint::InstrumentAllowed {
                allowed_instruments,
                ..
            } = constraint
            {
                if allowed_instruments.is_empty() {
                    return Err(ValidationError::UnknownConstraintKind(
                        "instrument_allowed constraint needs at least one instrument".into(),
                    ));
                }
            }
        }
        self.constraints.insert(role.into(), constraints);
        Ok(())
    }

    /// Evaluate every constraint registered for the context's role, in
    /// registration order, stopping at the first failure. A role with no
    /// registered constraints is accepted unconditionally.
    pub fn validate(&self, ctx: &ValidationContext, now_epoch_secs: i64) -> ValidationResult {
        let Some(constraints) = self.constraints.get(ctx.trader_role) else {
            return ValidationResult::accepted();
        };

        for constraint in constraints.iter() {
            match constraint {
                Constraint::InstrumentAllowed {
                    allowed_instruments,
                    error_code,
                    error_message,
                } => {
                    if !allowed_instruments.iter().any(|i| i == &ctx.order.instrument_id) {
                        return ValidationResult::rejected(error_code.clone(), error_message.clone());
                    }
                }
                Constraint::PositionLimit {
                    max_position,
                    symmetric,
                    error_code,
                    error_message,
                } => {
                    let new_position =
                        ctx.current_position + signed_delta(ctx.order.side, ctx.order.quantity);
                    let violated = if *symmetric {
                        new_position.abs() > *max_position
                    } else if new_position >= 0 {
                        new_position > *max_position
                    } else {
                        -new_position > *max_position
                    };
                    if violated {
                        return ValidationResult::rejected(error_code.clone(), error_message.clone());
                    }
                }
                Constraint::OrderRate {
                    max_orders_per_second,
                    error_code,
                    error_message,
                } => {
                    let count = self
                        .rate_counter
                        .increment(ctx.trader_id, now_epoch_secs);
                    if count > *max_orders_per_second as u64 {
                        return ValidationResult::rejected(error_code.clone(), error_message.clone());
                    }
                }
            }
        }

        ValidationResult::accepted()
    }
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderType;
    use rust_decimal_macros::dec;

    fn buy(qty: u64) -> Order {
        Order::new("SPX_4500_CALL", "TEAM_A", Side::Buy, OrderType::Limit, qty, Some(dec!(5.25)), None, 0).unwrap()
    }

    #[test]
    fn unknown_role_is_accepted_with_no_constraints() {
        let validator = ConstraintValidator::new();
        let order = buy(10);
        let ctx = ValidationContext {
            order: &order,
            trader_id: "TEAM_A",
            trader_role: "ghost",
            current_position: 0,
        };
        assert_eq!(validator.validate(&ctx, 0).status, ValidationStatus::Accepted);
    }

    #[test]
    fn instrument_not_in_whitelist_is_rejected() {
        let validator = ConstraintValidator::new();
        validator
            .load_constraints(
                "market_maker",
                vec![Constraint::InstrumentAllowed {
                    allowed_instruments: vec!["OTHER".into()],
                    error_code: "INVALID_INSTRUMENT".into(),
                    error_message: "instrument not allowed".into(),
                }],
            )
            .unwrap();
        let order = buy(10);
        let ctx = ValidationContext {
            order: &order,
            trader_id: "TEAM_A",
            trader_role: "market_maker",
            current_position: 0,
        };
        assert_eq!(validator.validate(&ctx, 0).status, ValidationStatus::Rejected);
    }

    #[test]
    fn symmetric_position_limit_bounds_both_directions() {
        let validator = ConstraintValidator::new();
        validator
            .load_constraints(
                "market_maker",
                vec![Constraint::PositionLimit {
                    max_position: 15,
                    symmetric: true,
                    error_code: "MM_POS_LIMIT".into(),
                    error_message: "position limit exceeded".into(),
                }],
            )
            .unwrap();
        let order = buy(10);
        let ctx = ValidationContext {
            order: &order,
            trader_id: "TEAM_A",
            trader_role: "market_maker",
            current_position: 10,
        };
        assert_eq!(validator.validate(&ctx, 0).status, ValidationStatus::Rejected);
    }

    #[test]
    fn asymmetric_position_limit_allows_short_beyond_long_cap() {
        let validator = ConstraintValidator::new();
        validator
            .load_constraints(
                "market_maker",
                vec![Constraint::PositionLimit {
                    max_position: 5,
                    symmetric: false,
                    error_code: "MM_POS_LIMIT".into(),
                    error_message: "position limit exceeded".into(),
                }],
            )
            .unwrap();
        let order = Order::new("SPX_4500_CALL", "TEAM_A", Side::Sell, OrderType::Limit, 20, Some(dec!(5.25)), None, 0).unwrap();
        let ctx = ValidationContext {
            order: &order,
            trader_id: "TEAM_A",
            trader_role: "market_maker",
            current_position: 0,
        };
        // -20 magnitude exceeds max_position=5 on the short side too under
        // the asymmetric rule's short branch.
        assert_eq!(validator.validate(&ctx, 0).status, ValidationStatus::Rejected);
    }

    #[test]
    fn order_rate_limit_trips_after_threshold() {
        let validator = ConstraintValidator::new();
        validator
            .load_constraints(
                "market_maker",
                vec![Constraint::OrderRate {
                    max_orders_per_second: 2,
                    error_code: "RATE_LIMIT_EXCEEDED".into(),
                    error_message: "rate limit exceeded".into(),
                }],
            )
            .unwrap();
        let order = buy(1);
        let ctx = ValidationContext {
            order: &order,
            trader_id: "TEAM_A",
            trader_role: "market_maker",
            current_position: 0,
        };
        assert_eq!(validator.validate(&ctx, 100).status, ValidationStatus::Accepted);
        assert_eq!(validator.validate(&ctx, 100).status, ValidationStatus::Accepted);
        assert_eq!(validator.validate(&ctx, 100).status, ValidationStatus::Rejected);
        // A new second resets the counter.
        assert_eq!(validator.validate(&ctx, 101).status, ValidationStatus::Accepted);
    }

    #[test]
    fn load_constraints_rejects_empty_whitelist_at_load_time() {
        let validator = ConstraintValidator::new();
        let err = validator
            .load_constraints(
                "market_maker",
                vec![Constraint::InstrumentAllowed {
                    allowed_instruments: vec![],
                    error_code: "INVALID_INSTRUMENT".into(),
                    error_message: "".into(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownConstraintKind(_)));
    }
}
