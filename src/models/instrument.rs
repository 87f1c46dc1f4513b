//! Instrument descriptors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option flavor for instruments that carry option terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// Immutable instrument descriptor.
///
/// `symbol` is the unique key used everywhere else in the system (order
/// books, positions, validator whitelists). Option instruments carry
/// strike/expiry/option_type; everything else carries only the underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub underlying: String,
    pub strike: Option<rust_decimal::Decimal>,
    pub expiry: Option<NaiveDate>,
    pub option_type: Option<OptionType>,
}

impl Instrument {
    /// Non-option instrument: symbol + underlying only.
    pub fn underlying(symbol: impl Into<String>, underlying: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            underlying: underlying.into(),
            strike: None,
            expiry: None,
            option_type: None,
        }
    }

    /// Option instrument: requires strike, expiry and option_type.
    pub fn option(
        symbol: impl Into<String>,
        underlying: impl Into<String>,
        strike: rust_decimal::Decimal,
        expiry: NaiveDate,
        option_type: OptionType,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            underlying: underlying.into(),
            strike: Some(strike),
            expiry: Some(expiry),
            option_type: Some(option_type),
        }
    }

    pub fn is_option(&self) -> bool {
        self.option_type.is_some()
    }
}
