//! Monetary amounts and currency
//!
//! Amounts are integers in minor currency units (Rappen/cents). Currency is
//! always an explicit field next to the amount, never inferred.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform commission, in percent of the engagement price.
pub const PLATFORM_FEE_PERCENT: i64 = 10;

/// Supported settlement currencies (lowercase ISO codes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Chf,
    Eur,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Chf => write!(f, "chf"),
            Currency::Eur => write!(f, "eur"),
        }
    }
}

/// Split a price into (platform_fee, expert_payout).
///
/// The two parts always sum back to the price; rounding loss stays on the
/// fee side.
pub fn split_fee(price: i64) -> (i64, i64) {
    let platform_fee = price * PLATFORM_FEE_PERCENT / 100;
    (platform_fee, price - platform_fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_and_payout_sum_to_price() {
        for price in [0, 1, 99, 100, 2500, 300_000, 123_457] {
            let (fee, payout) = split_fee(price);
            assert_eq!(fee + payout, price, "price {}", price);
        }
    }

    #[test]
    fn ten_percent_fee() {
        let (fee, payout) = split_fee(300_000);
        assert_eq!(fee, 30_000);
        assert_eq!(payout, 270_000);
    }

    #[test]
    fn currency_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Currency::Chf).unwrap(), "\"chf\"");
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"eur\"");
    }
}
