//! Persisted engine state: the storage capability, the validated rate
//! table, and the exchange-rate store that ties them together.

pub mod persistence;
pub mod rates;
