//! Settlement calculator.
//!
//! Splits an order price into platform fee and seller earnings. All
//! arithmetic is integer minor units; the two parts always sum back to the
//! price exactly, with the rounding remainder going to the seller.

use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub platform_fee_minor: i64,
    pub seller_earnings_minor: i64,
}

/// Compute the fee/earnings split for a price in minor units.
///
/// `fee_bps` is trusted to be within [0, 10000]; configuration validation
/// rejects anything else at startup. A negative price is a caller bug and
/// reported as an invalid argument.
pub fn split(price_minor: i64, fee_bps: u16) -> AppResult<Settlement> {
    if price_minor < 0 {
        return Err(AppError::invalid_argument("Price cannot be negative"));
    }

    // Widen before multiplying; price * bps can exceed i64.
    let platform_fee_minor = (price_minor as i128 * fee_bps as i128 / 10_000) as i64;

    Ok(Settlement {
        platform_fee_minor,
        seller_earnings_minor: price_minor - platform_fee_minor,
    })
}
