//! # currency-engine
//!
//! Multi-currency conversion and formatting engine.
//!
//! Maintains a table of exchange rates against a fixed base currency,
//! converts monetary amounts between any two supported currencies by
//! pivoting through the base, renders amounts as locale-correct strings,
//! and persists operator-edited rates plus the user's preferred display
//! currency across sessions.
//!
//! ## Architecture
//!
//! - **core** — Currency registry (closed code set, static metadata) and errors
//! - **store** — Persistence capability, rate table, exchange-rate store
//! - **money** — Explicit rounding rule, pivot converter, formatter
//! - **engine** — The facade the rest of the application talks to

pub mod core;
pub mod engine;
pub mod money;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{Currency, CurrencyCode};
    pub use crate::core::error::EngineError;
    pub use crate::engine::facade::{CurrencyEngine, EngineState};
    pub use crate::money::converter::convert;
    pub use crate::money::formatter::format;
    pub use crate::store::persistence::{JsonFileStore, MemoryStateStore, StateStore};
    pub use crate::store::rates::{ExchangeRateStore, RateTable};
}
