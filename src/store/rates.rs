use crate::core::currency::{self, CurrencyCode, BASE};
use crate::core::error::EngineError;
use crate::store::persistence::{StateStore, RATE_TABLE_KEY, SELECTED_CURRENCY_KEY};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Exchange rates relative to the base currency.
///
/// Every registered currency has an entry; the base currency's rate is
/// exactly 1 at all times. A rate of `r` means `r` base units buy 1 unit
/// of the quoted currency (`{CRC: 1, USD: 500}` puts one dollar at 500
/// colones). Mutation only happens through validated setters, so the
/// table is never partially invalid.
///
/// # Examples
///
/// ```
/// use currency_engine::core::currency::CurrencyCode;
/// use currency_engine::store::rates::RateTable;
/// use rust_decimal_macros::dec;
///
/// let mut table = RateTable::default();
/// assert_eq!(table.get(CurrencyCode::Usd), dec!(500));
///
/// table.set(CurrencyCode::Usd, dec!(525)).unwrap();
/// assert!(table.set(CurrencyCode::Usd, dec!(0)).is_err());
/// assert_eq!(table.get(CurrencyCode::Usd), dec!(525));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl Default for RateTable {
    /// The documented default table: every registry currency at its seed
    /// rate (`{CRC: 1, USD: 500}`).
    fn default() -> Self {
        let rates = currency::all()
            .iter()
            .map(|c| (c.code, c.default_rate))
            .collect();
        Self { rates }
    }
}

impl RateTable {
    /// Current rate for `code`. Total over the enum: every registered
    /// currency always has an entry.
    pub fn get(&self, code: CurrencyCode) -> Decimal {
        self.rates
            .get(&code)
            .copied()
            .unwrap_or(currency::metadata(code).default_rate)
    }

    /// Update a single rate.
    ///
    /// Rejects the base currency (its rate is fixed at 1) and any rate
    /// that is not strictly positive. On rejection the table is unchanged.
    pub fn set(&mut self, code: CurrencyCode, rate: Decimal) -> Result<(), EngineError> {
        Self::validate(code, rate, false)?;
        self.rates.insert(code, rate);
        Ok(())
    }

    /// Bulk update. Every entry is validated before any is applied, so
    /// the call is atomic: one bad entry leaves the whole table untouched.
    ///
    /// A base entry equal to exactly 1 is tolerated as a no-op, since bulk
    /// saves echo the full persisted table back. Codes absent from
    /// `entries` keep their current rate.
    pub fn set_all(&mut self, entries: &BTreeMap<CurrencyCode, Decimal>) -> Result<(), EngineError> {
        for (&code, &rate) in entries {
            Self::validate(code, rate, true)?;
        }
        for (&code, &rate) in entries {
            if !code.is_base() {
                self.rates.insert(code, rate);
            }
        }
        Ok(())
    }

    /// Iterate entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, Decimal)> + '_ {
        self.rates.iter().map(|(&code, &rate)| (code, rate))
    }

    /// Serialize to the persisted layout, e.g. `{"CRC":1.0,"USD":500.0}`.
    pub fn to_json(&self) -> String {
        let map: BTreeMap<&str, f64> = self
            .rates
            .iter()
            .map(|(code, rate)| (code.as_str(), rate.to_f64().unwrap_or_default()))
            .collect();
        serde_json::to_string(&map).unwrap_or_default()
    }

    /// Parse a persisted table, enforcing the structural invariants.
    ///
    /// Fails (and the caller discards the whole document) on malformed
    /// JSON, an unknown code, a non-positive or non-finite rate, a base
    /// entry other than 1, or a missing base entry. Known codes absent
    /// from the document keep their default rate.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let parsed: BTreeMap<String, f64> = serde_json::from_str(raw).map_err(|e| {
            EngineError::PersistenceUnavailable(format!("malformed rate table: {e}"))
        })?;

        let mut table = RateTable::default();
        let mut saw_base = false;
        for (key, value) in parsed {
            let code = CurrencyCode::parse(&key)?;
            let rate = Decimal::from_f64(value)
                .ok_or_else(|| EngineError::non_finite_rate(code, value))?;
            if code.is_base() {
                if rate != Decimal::ONE {
                    return Err(EngineError::base_rate_fixed(code));
                }
                saw_base = true;
                continue;
            }
            if rate <= Decimal::ZERO {
                return Err(EngineError::non_positive_rate(code, rate));
            }
            table.rates.insert(code, rate);
        }

        if !saw_base {
            return Err(EngineError::InvalidRate {
                code: BASE,
                reason: "persisted rate table is missing the base entry".to_string(),
            });
        }
        Ok(table)
    }

    fn validate(code: CurrencyCode, rate: Decimal, allow_base_identity: bool) -> Result<(), EngineError> {
        if code.is_base() {
            if allow_base_identity && rate == Decimal::ONE {
                return Ok(());
            }
            return Err(EngineError::base_rate_fixed(code));
        }
        if rate <= Decimal::ZERO {
            return Err(EngineError::non_positive_rate(code, rate));
        }
        Ok(())
    }

    // Bypasses validation so converter tests can exercise their own guard.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, code: CurrencyCode, rate: Decimal) {
        self.rates.insert(code, rate);
    }
}

/// Owns the rate table and the user's selected display currency, and keeps
/// both in sync with the injected [`StateStore`].
///
/// Every successful mutation persists synchronously before returning. If
/// the backend ever fails, the condition is logged once and the store
/// continues purely in memory for the rest of the session.
pub struct ExchangeRateStore {
    backend: Box<dyn StateStore>,
    table: RateTable,
    selected: CurrencyCode,
    persistence_lost: bool,
}

impl ExchangeRateStore {
    /// Create a store over `backend`, seeded with the default table and
    /// the base currency selected. Call [`load`](Self::load) to overlay
    /// persisted state.
    pub fn new(backend: Box<dyn StateStore>) -> Self {
        Self {
            backend,
            table: RateTable::default(),
            selected: BASE,
            persistence_lost: false,
        }
    }

    /// Load persisted state.
    ///
    /// Infallible by design: an absent or structurally invalid rate table
    /// is discarded in favor of the defaults, an unparseable selected
    /// currency resets to the base, and a failing backend degrades the
    /// store to memory-only operation.
    pub fn load(&mut self) {
        match self.backend.load(RATE_TABLE_KEY) {
            Ok(Some(raw)) => match RateTable::from_json(&raw) {
                Ok(table) => self.table = table,
                Err(e) => {
                    log::warn!("discarding persisted rate table, seeding defaults: {e}");
                    self.table = RateTable::default();
                }
            },
            Ok(None) => log::debug!("no persisted rate table, seeding defaults"),
            Err(e) => self.note_persistence_lost(&e),
        }

        match self.backend.load(SELECTED_CURRENCY_KEY) {
            Ok(Some(raw)) => {
                self.selected = serde_json::from_str(&raw).unwrap_or_else(|_| {
                    log::warn!("persisted selected currency is invalid, resetting to {BASE}");
                    BASE
                });
            }
            Ok(None) => {}
            Err(e) => self.note_persistence_lost(&e),
        }
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn rate(&self, code: CurrencyCode) -> Decimal {
        self.table.get(code)
    }

    /// Validated single-rate update, persisted on success.
    pub fn set_rate(&mut self, code: CurrencyCode, rate: Decimal) -> Result<(), EngineError> {
        self.table.set(code, rate)?;
        self.persist_rates();
        Ok(())
    }

    /// Validated atomic bulk update, persisted on success.
    pub fn set_all(&mut self, entries: &BTreeMap<CurrencyCode, Decimal>) -> Result<(), EngineError> {
        self.table.set_all(entries)?;
        self.persist_rates();
        Ok(())
    }

    pub fn selected_currency(&self) -> CurrencyCode {
        self.selected
    }

    /// Change the display currency and persist the choice. The code is
    /// already enum-typed, so no validation can fail here; string input is
    /// parsed at the facade boundary.
    pub fn set_selected_currency(&mut self, code: CurrencyCode) {
        self.selected = code;
        self.persist_selected();
    }

    /// Whether the backend has failed this session (memory-only mode).
    pub fn persistence_lost(&self) -> bool {
        self.persistence_lost
    }

    fn persist_rates(&mut self) {
        if self.persistence_lost {
            return;
        }
        let json = self.table.to_json();
        if let Err(e) = self.backend.save(RATE_TABLE_KEY, &json) {
            self.note_persistence_lost(&e);
        }
    }

    fn persist_selected(&mut self) {
        if self.persistence_lost {
            return;
        }
        match serde_json::to_string(&self.selected) {
            Ok(json) => {
                if let Err(e) = self.backend.save(SELECTED_CURRENCY_KEY, &json) {
                    self.note_persistence_lost(&e);
                }
            }
            Err(e) => log::warn!("could not encode selected currency: {e}"),
        }
    }

    fn note_persistence_lost(&mut self, err: &EngineError) {
        if !self.persistence_lost {
            self.persistence_lost = true;
            log::warn!("persistence unavailable, continuing in memory for this session: {err}");
        }
    }
}
