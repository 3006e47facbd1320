//! The facade composing converter, formatter, and the exchange-rate store.

pub mod facade;
