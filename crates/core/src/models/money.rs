use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::CoreError;

/// Number of decimal places kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse user-entered text into an amount.
///
/// Accepts plain decimal notation (`"12.5"`, `" 100 "`) and scientific
/// notation. Anything that is not a number is a validation error; the sign
/// is not checked here.
pub fn parse_amount(input: &str) -> Result<Decimal, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Amount is empty".into()));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| CoreError::Validation(format!("Amount '{trimmed}' is not a number")))
}

/// Convert a floating point amount into a decimal, rejecting NaN and infinities.
pub fn amount_from_f64(value: f64) -> Result<Decimal, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "Amount {value} is not a finite number"
        )));
    }
    // Shortest round-trip text, so 19.99 stays 19.99 rather than its binary expansion.
    Decimal::from_str(&value.to_string())
        .map_err(|_| CoreError::Validation(format!("Amount {value} is out of range")))
}
