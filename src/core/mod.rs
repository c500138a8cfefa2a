//! Foundational types: currencies, rate providers and market inputs.

pub mod currency;
pub mod market;
pub mod snapshot;
