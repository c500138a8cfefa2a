//! Monte Carlo simulation of terminal FX rates and distribution binning.

pub mod histogram;
pub mod monte_carlo;
