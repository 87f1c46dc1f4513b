//! Fee engine: role-indexed maker/taker schedule applied per fill.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityType {
    Maker,
    Taker,
}

/// Determine liquidity type from the fill's order side vs. the trade's
/// aggressor side: matching the aggressor means taker, anything else maker.
pub fn liquidity_type(
    order_side: crate::models::order::Side,
    aggressor_side: crate::models::order::Side,
) -> LiquidityType {
    if order_side == aggressor_side {
        LiquidityType::Taker
    } else {
        LiquidityType::Maker
    }
}

/// Per-role fee rates. Positive credits the trader, negative debits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub maker_rebate: Decimal,
    pub taker_fee: Decimal,
}

pub struct FeeEngine {
    schedules: HashMap<String, FeeSchedule>,
}

impl FeeEngine {
    pub fn new() -> Self {
        Self {
            schedules: HashMap::new(),
        }
    }

    pub fn register(&mut self, role: impl Into<String>, schedule: FeeSchedule) {
        self.schedules.insert(role.into(), schedule);
    }

    pub fn schedule(&self, role: &str) -> Result<FeeSchedule, String> {
        self.schedules.get(role).copied().ok_or_else(|| {
            let known: Vec<&str> = self.schedules.keys().map(String::as_str).collect();
            format!("Unknown role: {role}. Known roles: {}", known.join(", "))
        })
    }

    /// Compute the signed fee for `quantity` units at `role`'s rate for
    /// `liquidity_type`. Zero quantity always yields zero fee, without
    /// requiring a registered role.
    pub fn fee(
        &self,
        quantity: u64,
        role: &str,
        liquidity_type: LiquidityType,
    ) -> Result<Decimal, String> {
        if quantity == 0 {
            return Ok(Decimal::ZERO);
        }
        let schedule = self.schedule(role)?;
        let rate = match liquidity_type {
            LiquidityType::Maker => schedule.maker_rebate,
            LiquidityType::Taker => schedule.taker_fee,
        };
        Ok(rate * Decimal::from(quantity))
    }
}

impl Default for FeeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::Side;
    use rust_decimal_macros::dec;

    fn engine() -> FeeEngine {
        let mut engine = FeeEngine::new();
        engine.register(
            "market_maker",
            FeeSchedule {
                maker_rebate: dec!(0.02),
                taker_fee: dec!(-0.03),
            },
        );
        engine
    }

    #[test]
    fn liquidity_type_matches_aggressor_comparison() {
        assert_eq!(liquidity_type(Side::Buy, Side::Buy), LiquidityType::Taker);
        assert_eq!(liquidity_type(Side::Sell, Side::Buy), LiquidityType::Maker);
    }

    #[test]
    fn maker_fee_is_a_credit() {
        let fee = engine().fee(10, "market_maker", LiquidityType::Maker).unwrap();
        assert_eq!(fee, dec!(0.20));
    }

    #[test]
    fn taker_fee_is_a_debit() {
        let fee = engine().fee(10, "market_maker", LiquidityType::Taker).unwrap();
        assert_eq!(fee, dec!(-0.30));
    }

    #[test]
    fn zero_quantity_is_always_zero_fee() {
        let fee = engine().fee(0, "unknown_role", LiquidityType::Taker).unwrap();
        assert_eq!(fee, Decimal::ZERO);
    }

    #[test]
    fn unknown_role_lists_known_roles_in_the_error() {
        let err = engine().fee(10, "unknown", LiquidityType::Taker).unwrap_err();
        assert!(err.contains("Unknown role: unknown"));
        assert!(err.contains("market_maker"));
    }
}
