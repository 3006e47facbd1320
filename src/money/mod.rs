//! Pure monetary computation: rounding, pivot conversion, formatting.

pub mod converter;
pub mod formatter;
pub mod rounding;
