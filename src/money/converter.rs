use crate::core::currency::{self, CurrencyCode};
use crate::core::error::EngineError;
use crate::money::rounding::round_half_away_from_zero;
use crate::store::rates::RateTable;
use rust_decimal::Decimal;

/// Convert `amount` from one currency to another, pivoting through the base.
///
/// Rates are quoted as base units per 1 unit of the quoted currency, so the
/// pivot is `amount * rate(from)` into the base and `/ rate(to)` out of it.
/// The result is rounded to the destination currency's decimal precision
/// with the engine's single rounding rule. The same-currency case is an
/// exact identity: no rounding is applied.
///
/// # Examples
///
/// ```
/// use currency_engine::core::currency::CurrencyCode;
/// use currency_engine::money::converter::convert;
/// use currency_engine::store::rates::RateTable;
/// use rust_decimal_macros::dec;
///
/// let table = RateTable::default(); // {CRC: 1, USD: 500}
/// let usd = convert(&table, dec!(500), CurrencyCode::Crc, CurrencyCode::Usd).unwrap();
/// assert_eq!(usd, dec!(1.00));
/// ```
pub fn convert(
    table: &RateTable,
    amount: Decimal,
    from: CurrencyCode,
    to: CurrencyCode,
) -> Result<Decimal, EngineError> {
    if from == to {
        return Ok(amount);
    }

    let base_amount = if from.is_base() {
        amount
    } else {
        amount * positive_rate(table, from)?
    };

    let result = if to.is_base() {
        base_amount
    } else {
        base_amount / positive_rate(table, to)?
    };

    let dp = currency::metadata(to).decimal_places;
    Ok(round_half_away_from_zero(result, dp))
}

/// The unrounded price of 1 unit of `from` expressed in `to`.
///
/// Used for rate display ("1 USD = 500.0000 CRC"); callers round to
/// whatever precision suits the surface.
pub fn cross_rate(
    table: &RateTable,
    from: CurrencyCode,
    to: CurrencyCode,
) -> Result<Decimal, EngineError> {
    if from == to {
        return Ok(Decimal::ONE);
    }

    let base_value = if from.is_base() {
        Decimal::ONE
    } else {
        positive_rate(table, from)?
    };

    if to.is_base() {
        Ok(base_value)
    } else {
        Ok(base_value / positive_rate(table, to)?)
    }
}

// The store boundary rejects non-positive rates, but the converter must
// not rely on that: a bad rate fails here instead of dividing by zero.
fn positive_rate(table: &RateTable, code: CurrencyCode) -> Result<Decimal, EngineError> {
    let rate = table.get(code);
    if rate <= Decimal::ZERO {
        return Err(EngineError::non_positive_rate(code, rate));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identity_is_exact() {
        let table = RateTable::default();
        let amount = dec!(123.456789);
        let result = convert(&table, amount, CurrencyCode::Usd, CurrencyCode::Usd).unwrap();
        assert_eq!(result, amount); // no rounding on the trivial case
    }

    #[test]
    fn test_pivot_to_foreign() {
        let table = RateTable::default();
        let result = convert(&table, dec!(500), CurrencyCode::Crc, CurrencyCode::Usd).unwrap();
        assert_eq!(result, dec!(1.00));
    }

    #[test]
    fn test_pivot_to_base() {
        let table = RateTable::default();
        let result = convert(&table, dec!(1), CurrencyCode::Usd, CurrencyCode::Crc).unwrap();
        assert_eq!(result, dec!(500.00));
    }

    #[test]
    fn test_result_rounds_half_away_from_zero() {
        let table = RateTable::default();
        // 502.5 CRC -> 1.005 USD -> rounds up to 1.01
        let result = convert(&table, dec!(502.5), CurrencyCode::Crc, CurrencyCode::Usd).unwrap();
        assert_eq!(result, dec!(1.01));
    }

    #[test]
    fn test_negative_amounts_convert() {
        let table = RateTable::default();
        let result = convert(&table, dec!(-500), CurrencyCode::Crc, CurrencyCode::Usd).unwrap();
        assert_eq!(result, dec!(-1.00));
    }

    #[test]
    fn test_cross_rate_directions() {
        let table = RateTable::default();
        assert_eq!(
            cross_rate(&table, CurrencyCode::Usd, CurrencyCode::Crc).unwrap(),
            dec!(500)
        );
        assert_eq!(
            cross_rate(&table, CurrencyCode::Crc, CurrencyCode::Usd).unwrap(),
            dec!(0.002)
        );
        assert_eq!(
            cross_rate(&table, CurrencyCode::Usd, CurrencyCode::Usd).unwrap(),
            Decimal::ONE
        );
    }

    #[test]
    fn test_corrupt_rate_rejected_not_divided() {
        let mut table = RateTable::default();
        table.insert_unchecked(CurrencyCode::Usd, Decimal::ZERO);
        let result = convert(&table, dec!(100), CurrencyCode::Crc, CurrencyCode::Usd);
        assert!(matches!(result, Err(EngineError::InvalidRate { .. })));
    }
}
