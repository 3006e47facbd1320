//! Foundational types: currency registry and engine errors.

pub mod currency;
pub mod error;
