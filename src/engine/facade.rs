use crate::core::currency::CurrencyCode;
use crate::core::error::EngineError;
use crate::money::rounding::round_half_away_from_zero;
use crate::money::{converter, formatter};
use crate::store::persistence::StateStore;
use crate::store::rates::{ExchangeRateStore, RateTable};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Lifecycle state of the engine.
///
/// The transition Loading → Ready is one-way and happens once per session
/// when [`CurrencyEngine::load`] resolves. There is no error state: a
/// failed load falls back to the documented defaults and still reaches
/// Ready, because the default table is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Persisted state not yet resolved; operations run against defaults.
    Loading,
    /// Rate table and selected currency available.
    Ready,
}

/// The engine surface consumed by the rest of the application.
///
/// String currency codes and `f64` amounts from the UI enter here and are
/// validated exactly once; everything underneath works in enum and
/// `Decimal` terms. All mutations persist synchronously through the
/// injected [`StateStore`] before returning.
///
/// # Examples
///
/// ```
/// use currency_engine::engine::facade::CurrencyEngine;
/// use currency_engine::store::persistence::MemoryStateStore;
///
/// let mut engine = CurrencyEngine::open(Box::new(MemoryStateStore::new()));
/// assert_eq!(engine.format(1234.5, true).unwrap(), "₡1,234.50");
///
/// engine.set_selected_currency("USD").unwrap();
/// assert_eq!(engine.format_with_conversion(1000.0, "CRC").unwrap(), "$2.00");
/// ```
pub struct CurrencyEngine {
    store: ExchangeRateStore,
    state: EngineState,
}

impl CurrencyEngine {
    /// Construct in the Loading state with seeded defaults.
    pub fn new(backend: Box<dyn StateStore>) -> Self {
        Self {
            store: ExchangeRateStore::new(backend),
            state: EngineState::Loading,
        }
    }

    /// Construct and immediately resolve persisted state.
    pub fn open(backend: Box<dyn StateStore>) -> Self {
        let mut engine = Self::new(backend);
        engine.load();
        engine
    }

    /// Resolve persisted state and transition to Ready. Idempotent; a
    /// second call is a no-op.
    pub fn load(&mut self) {
        if self.state == EngineState::Ready {
            return;
        }
        self.store.load();
        self.state = EngineState::Ready;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == EngineState::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    /// The user's preferred display currency.
    pub fn selected_currency(&self) -> CurrencyCode {
        self.store.selected_currency()
    }

    /// Change the display currency; persisted on success.
    pub fn set_selected_currency(&mut self, code: &str) -> Result<(), EngineError> {
        let code = CurrencyCode::parse(code)?;
        self.store.set_selected_currency(code);
        Ok(())
    }

    /// Current rate for `code` relative to the base currency.
    pub fn rate(&self, code: &str) -> Result<Decimal, EngineError> {
        Ok(self.store.rate(CurrencyCode::parse(code)?))
    }

    /// Update a single rate from operator input; persisted on success.
    pub fn set_rate(&mut self, code: &str, rate: f64) -> Result<(), EngineError> {
        let code = CurrencyCode::parse(code)?;
        let rate = Decimal::from_f64(rate)
            .ok_or_else(|| EngineError::non_finite_rate(code, rate))?;
        self.store.set_rate(code, rate)
    }

    /// Atomic bulk rate update from an administrative form.
    pub fn set_all_rates(&mut self, rates: &BTreeMap<String, f64>) -> Result<(), EngineError> {
        let mut entries = BTreeMap::new();
        for (key, &value) in rates {
            let code = CurrencyCode::parse(key)?;
            let rate = Decimal::from_f64(value)
                .ok_or_else(|| EngineError::non_finite_rate(code, value))?;
            entries.insert(code, rate);
        }
        self.store.set_all(&entries)
    }

    /// Read-only view of the current table, for the settings surface.
    pub fn rates(&self) -> &RateTable {
        self.store.table()
    }

    /// Convert `amount` between two currencies through the base pivot.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Decimal, EngineError> {
        let amount = finite_amount(amount)?;
        converter::convert(
            self.store.table(),
            amount,
            CurrencyCode::parse(from)?,
            CurrencyCode::parse(to)?,
        )
    }

    /// Format `value` in the currently selected currency.
    pub fn format(&self, value: f64, show_symbol: bool) -> Result<String, EngineError> {
        Ok(formatter::format(
            finite_amount(value)?,
            self.store.selected_currency(),
            show_symbol,
        ))
    }

    /// Convert `value` from `from` into the selected currency, then format
    /// it with the symbol. The dominant call pattern: values are stored in
    /// one currency and shown in the user's currency.
    pub fn format_with_conversion(&self, value: f64, from: &str) -> Result<String, EngineError> {
        formatter::format_with_conversion(
            self.store.table(),
            finite_amount(value)?,
            CurrencyCode::parse(from)?,
            self.store.selected_currency(),
            true,
        )
    }

    /// Human-readable cross rate, e.g. `"1 USD = 500.0000 CRC"`.
    pub fn rate_description(&self, from: &str, to: &str) -> Result<String, EngineError> {
        let from = CurrencyCode::parse(from)?;
        let to = CurrencyCode::parse(to)?;
        let rate = converter::cross_rate(self.store.table(), from, to)?;
        let rate = round_half_away_from_zero(rate, 4);
        Ok(format!("1 {from} = {rate:.4} {to}"))
    }

    /// Whether persistence failed this session (engine is memory-only).
    pub fn persistence_lost(&self) -> bool {
        self.store.persistence_lost()
    }
}

// The f64 boundary: NaN and infinities are rejected here so nothing
// below ever sees a non-finite amount.
fn finite_amount(value: f64) -> Result<Decimal, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidAmount(value));
    }
    Decimal::from_f64(value).ok_or(EngineError::InvalidAmount(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::persistence::MemoryStateStore;
    use rust_decimal_macros::dec;

    fn engine() -> CurrencyEngine {
        CurrencyEngine::open(Box::new(MemoryStateStore::new()))
    }

    #[test]
    fn test_loading_to_ready_is_one_way() {
        let mut engine = CurrencyEngine::new(Box::new(MemoryStateStore::new()));
        assert!(engine.is_loading());

        engine.load();
        assert!(engine.is_ready());

        engine.load(); // no-op
        assert!(engine.is_ready());
    }

    #[test]
    fn test_defaults_before_load() {
        // Operations issued while Loading run against seeded defaults.
        let engine = CurrencyEngine::new(Box::new(MemoryStateStore::new()));
        assert_eq!(engine.rate("USD").unwrap(), dec!(500));
        assert_eq!(engine.selected_currency(), CurrencyCode::Crc);
    }

    #[test]
    fn test_convert_and_format() {
        let engine = engine();
        assert_eq!(engine.convert(500.0, "CRC", "USD").unwrap(), dec!(1.00));
        assert_eq!(engine.convert(1.0, "USD", "CRC").unwrap(), dec!(500.00));
        assert_eq!(engine.format(1234.5, true).unwrap(), "₡1,234.50");
        assert_eq!(engine.format(1234.5, false).unwrap(), "1,234.50");
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.convert(f64::NAN, "CRC", "USD"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            engine.format(f64::INFINITY, true),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_unknown_codes_rejected_at_boundary() {
        let mut engine = engine();
        assert!(matches!(
            engine.convert(10.0, "CRC", "EUR"),
            Err(EngineError::UnknownCurrency(_))
        ));
        assert!(matches!(
            engine.set_selected_currency("XML"),
            Err(EngineError::UnknownCurrency(_))
        ));
        assert!(matches!(
            engine.rate("eur"),
            Err(EngineError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_set_rate_rejections_leave_rate_unchanged() {
        let mut engine = engine();
        assert!(matches!(
            engine.set_rate("USD", 0.0),
            Err(EngineError::InvalidRate { .. })
        ));
        assert!(matches!(
            engine.set_rate("USD", -5.0),
            Err(EngineError::InvalidRate { .. })
        ));
        assert!(matches!(
            engine.set_rate("USD", f64::NAN),
            Err(EngineError::InvalidRate { .. })
        ));
        assert!(matches!(
            engine.set_rate("CRC", 2.0),
            Err(EngineError::InvalidRate { .. })
        ));
        assert_eq!(engine.rate("USD").unwrap(), dec!(500));
    }

    #[test]
    fn test_format_with_conversion_uses_selected_currency() {
        let mut engine = engine();
        engine.set_selected_currency("USD").unwrap();
        assert_eq!(
            engine.format_with_conversion(1000.0, "CRC").unwrap(),
            "$2.00"
        );
        // already in the selected currency: identity, just formatting
        assert_eq!(
            engine.format_with_conversion(1000.0, "USD").unwrap(),
            "$1,000.00"
        );
    }

    #[test]
    fn test_rate_description() {
        let engine = engine();
        assert_eq!(
            engine.rate_description("USD", "CRC").unwrap(),
            "1 USD = 500.0000 CRC"
        );
        assert_eq!(
            engine.rate_description("CRC", "USD").unwrap(),
            "1 CRC = 0.0020 USD"
        );
    }

    #[test]
    fn test_set_all_rates_from_string_keys() {
        let mut engine = engine();
        let mut form = BTreeMap::new();
        form.insert("CRC".to_string(), 1.0);
        form.insert("USD".to_string(), 520.0);
        engine.set_all_rates(&form).unwrap();
        assert_eq!(engine.rate("USD").unwrap(), dec!(520));

        form.insert("EUR".to_string(), 600.0);
        assert!(matches!(
            engine.set_all_rates(&form),
            Err(EngineError::UnknownCurrency(_))
        ));
        // rejected call left the table as it was
        assert_eq!(engine.rate("USD").unwrap(), dec!(520));
    }
}
