use rust_decimal::{Decimal, RoundingStrategy};

/// Round `value` to `dp` decimal places, half away from zero.
///
/// This is the engine's single rounding rule. It is applied explicitly
/// before any display or conversion result is produced, so behavior is
/// identical across runtimes and never depends on locale machinery.
///
/// # Examples
///
/// ```
/// use currency_engine::money::rounding::round_half_away_from_zero;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_half_away_from_zero(dec!(1.005), 2), dec!(1.01));
/// assert_eq!(round_half_away_from_zero(dec!(-1.005), 2), dec!(-1.01));
/// ```
pub fn round_half_away_from_zero(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
