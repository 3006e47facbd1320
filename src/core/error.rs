use crate::core::currency::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the currency engine.
///
/// Validation errors (`UnknownCurrency`, `InvalidRate`, `InvalidAmount`)
/// are returned synchronously to the caller and never mutate state.
/// `PersistenceUnavailable` is the only kind the engine itself downgrades:
/// the store logs it once and keeps operating in memory for the session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A code outside the registered currency set was used.
    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),

    /// A proposed or stored exchange rate is unusable.
    #[error("invalid exchange rate for {code}: {reason}")]
    InvalidRate { code: CurrencyCode, reason: String },

    /// A monetary input is not a finite number (NaN or infinite).
    #[error("amount {0} is not a finite number")]
    InvalidAmount(f64),

    /// The underlying storage read/write failed.
    #[error("persistent storage unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl EngineError {
    /// A rate that is zero or negative.
    pub(crate) fn non_positive_rate(code: CurrencyCode, rate: Decimal) -> Self {
        EngineError::InvalidRate {
            code,
            reason: format!("rate must be positive, got {rate}"),
        }
    }

    /// A rate that does not convert to a finite decimal.
    pub(crate) fn non_finite_rate(code: CurrencyCode, rate: f64) -> Self {
        EngineError::InvalidRate {
            code,
            reason: format!("rate must be a finite number, got {rate}"),
        }
    }

    /// An attempt to override the fixed base-currency rate.
    pub(crate) fn base_rate_fixed(code: CurrencyCode) -> Self {
        EngineError::InvalidRate {
            code,
            reason: "base currency rate is fixed at 1".to_string(),
        }
    }
}
