//! # Decimal Rounding Rules
//!
//! All ratio and money arithmetic rounds half-up (midpoint away from zero)
//! and is then rescaled, so a ratio always prints with 6 places and a salary
//! with 2.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on a compa-ratio.
pub const RATIO_SCALE: u32 = 6;

/// Decimal places kept on a currency amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Round half-up to `dp` places and fix the scale at exactly `dp`.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Round a compa-ratio to 6 places.
pub fn round_ratio(value: Decimal) -> Decimal {
    round_half_up(value, RATIO_SCALE)
}

/// Round a currency amount to 2 places.
pub fn round_currency(value: Decimal) -> Decimal {
    round_half_up(value, CURRENCY_SCALE)
}

/// Express a ratio as a whole-or-fractional percentage with trailing zeros
/// stripped (`0.70` → `"70"`, `1.015` → `"101.5"`).
pub fn ratio_as_percent(value: Decimal) -> String {
    (value * Decimal::ONE_HUNDRED).normalize().to_string()
}
