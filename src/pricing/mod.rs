//! Closed-form option valuation.

pub mod black_scholes;

use statrs::distribution::{ContinuousCDF, Normal};

/// Standard normal cumulative distribution function Φ.
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}
