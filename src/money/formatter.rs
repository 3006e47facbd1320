use crate::core::currency::{self, CurrencyCode};
use crate::core::error::EngineError;
use crate::money::converter::convert;
use crate::money::rounding::round_half_away_from_zero;
use crate::store::rates::RateTable;
use rust_decimal::Decimal;

/// Render `value` as a locale-correct currency string.
///
/// The value is rounded to the currency's fixed decimal precision with the
/// engine's explicit rounding rule, integer digits are grouped per the
/// currency's locale, and the symbol is prepended when `show_symbol` is
/// true. Negative values carry the sign before the symbol.
///
/// # Examples
///
/// ```
/// use currency_engine::core::currency::CurrencyCode;
/// use currency_engine::money::formatter::format;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format(dec!(1234.5), CurrencyCode::Crc, true), "₡1,234.50");
/// assert_eq!(format(dec!(1234.5), CurrencyCode::Usd, true), "$1,234.50");
/// ```
pub fn format(value: Decimal, code: CurrencyCode, show_symbol: bool) -> String {
    let meta = currency::metadata(code);
    let rounded = round_half_away_from_zero(value, meta.decimal_places);
    let (group_sep, decimal_sep) = separators(meta.locale);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let fixed = format!("{:.*}", meta.decimal_places as usize, rounded.abs());
    let (int_digits, frac_digits) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::with_capacity(fixed.len() + 8);
    if negative {
        out.push('-');
    }
    if show_symbol {
        out.push_str(meta.symbol);
    }
    push_grouped(&mut out, int_digits, group_sep);
    if !frac_digits.is_empty() {
        out.push(decimal_sep);
        out.push_str(frac_digits);
    }
    out
}

/// Convert `value` into `to`, then format it.
///
/// This is the dominant call pattern in the surrounding application:
/// values are stored in one currency but displayed in the user's selected
/// currency.
pub fn format_with_conversion(
    table: &RateTable,
    value: Decimal,
    from: CurrencyCode,
    to: CurrencyCode,
    show_symbol: bool,
) -> Result<String, EngineError> {
    let converted = convert(table, value, from, to)?;
    Ok(format(converted, to, show_symbol))
}

/// Digit separators (grouping, decimal) for a locale tag.
///
/// Every registry locale today groups thousands with `,` and uses `.` as
/// the decimal point; locales that flip the separators get their own arm.
fn separators(locale: &str) -> (char, char) {
    match locale {
        "de-DE" => ('.', ','),
        _ => (',', '.'),
    }
}

// Integer digits are ASCII, so byte-position arithmetic is safe.
fn push_grouped(out: &mut String, digits: &str, sep: char) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
}
