use crate::core::error::EngineError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported currency code.
///
/// The set of currencies is closed: every code is a variant, so once a
/// string has been parsed at the boundary no further validation is needed
/// anywhere below it. Unknown codes are rejected by [`CurrencyCode::parse`]
/// with [`EngineError::UnknownCurrency`].
///
/// # Examples
///
/// ```
/// use currency_engine::core::currency::CurrencyCode;
///
/// let crc = CurrencyCode::parse("CRC").unwrap();
/// assert_eq!(crc, CurrencyCode::Crc);
/// assert!(CurrencyCode::parse("EUR").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurrencyCode {
    /// Costa Rican colón — the base currency.
    #[serde(rename = "CRC")]
    Crc,
    /// United States dollar.
    #[serde(rename = "USD")]
    Usd,
}

/// The base currency. Its rate is fixed at 1 and all conversions
/// pivot through it.
pub const BASE: CurrencyCode = CurrencyCode::Crc;

impl CurrencyCode {
    /// Every registered currency code.
    pub const ALL: [CurrencyCode; 2] = [CurrencyCode::Crc, CurrencyCode::Usd];

    /// Parse an ISO-style code string.
    ///
    /// Leading/trailing whitespace is ignored; the match itself is
    /// case-sensitive uppercase, which is the form the registry, the
    /// persisted state, and the UI all use.
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        match input.trim() {
            "CRC" => Ok(CurrencyCode::Crc),
            "USD" => Ok(CurrencyCode::Usd),
            other => Err(EngineError::UnknownCurrency(other.to_string())),
        }
    }

    /// Returns the ISO code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Crc => "CRC",
            CurrencyCode::Usd => "USD",
        }
    }

    /// Whether this is the base currency.
    pub fn is_base(&self) -> bool {
        *self == BASE
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Static metadata for a registered currency.
///
/// The registry is the single source of truth for the symbol, display
/// locale, and decimal precision used during formatting and validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Currency {
    pub code: CurrencyCode,
    /// Display symbol, e.g. `₡` or `$`.
    pub symbol: &'static str,
    /// BCP-47 locale tag governing digit grouping.
    pub locale: &'static str,
    /// Fixed number of decimal places for display and conversion rounding.
    pub decimal_places: u32,
    /// Documented seed rate relative to the base currency
    /// (how many base units buy 1 unit of this currency).
    pub default_rate: Decimal,
}

static REGISTRY: [Currency; 2] = [
    Currency {
        code: CurrencyCode::Crc,
        symbol: "₡",
        locale: "es-CR",
        decimal_places: 2,
        default_rate: Decimal::ONE,
    },
    Currency {
        code: CurrencyCode::Usd,
        symbol: "$",
        locale: "en-US",
        decimal_places: 2,
        default_rate: dec!(500),
    },
];

/// Look up currency metadata from a code string.
///
/// This is the validation gate for string-typed input: it fails with
/// [`EngineError::UnknownCurrency`] for any code outside the registry.
pub fn lookup(code: &str) -> Result<&'static Currency, EngineError> {
    Ok(metadata(CurrencyCode::parse(code)?))
}

/// Metadata for an already-validated code. Total over the enum.
pub fn metadata(code: CurrencyCode) -> &'static Currency {
    match code {
        CurrencyCode::Crc => &REGISTRY[0],
        CurrencyCode::Usd => &REGISTRY[1],
    }
}

/// All registered currencies, base first.
pub fn all() -> &'static [Currency] {
    &REGISTRY
}
