//! Fixed-point price level key, sortable by exact value.
//!
//! Decimal doesn't implement `Ord` usably as a BTreeMap key across
//! differently-scaled representations of the same value, so prices are
//! normalized to an 8-decimal-place fixed-point integer before being used
//! as a map key. This mirrors the convention used elsewhere in the matching
//! engine for price-level bucketing.

use rust_decimal::Decimal;
use std::cmp::Ordering;

const SCALE: i64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceLevel(i64);

impl PriceLevel {
    pub fn from_decimal(price: Decimal) -> Self {
        let scaled = (price * Decimal::from(SCALE)).trunc();
        let value = scaled.mantissa() / 10i128.pow(scaled.scale());
        PriceLevel(value as i64)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(SCALE)
    }
}

impl Ord for PriceLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for PriceLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_trips_exactly() {
        let price = dec!(5.25);
        assert_eq!(PriceLevel::from_decimal(price).to_decimal(), price);
    }

    #[test]
    fn orders_by_numeric_value() {
        let low = PriceLevel::from_decimal(dec!(5.25));
        let high = PriceLevel::from_decimal(dec!(5.30));
        assert!(low < high);
    }
}
