//! # currency-run
//!
//! Currency-run risk estimation for FX pairs.
//!
//! Given a spot rate and a hypothetical European call contract, this crate
//! prices the contract with Black-Scholes-Merton and simulates terminal
//! exchange rates to estimate the probability that the rate falls below
//! the strike (a "currency run").
//!
//! ## Architecture
//!
//! - **core** — Currency codes and pairs, rate providers, validated market inputs
//! - **pricing** — Closed-form call valuation and the normal CDF
//! - **simulation** — Monte Carlo terminal-rate draws and histogram binning
//! - **analysis** — Scenario inputs, bounds, and the end-to-end risk report

pub mod analysis;
pub mod core;
pub mod pricing;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::inputs::{ParameterBounds, ScenarioInputs, StrikeSpec};
    pub use crate::analysis::report::RiskReport;
    pub use crate::analysis::{evaluate_scenario, AnalysisConfig, AnalysisError, RiskAnalyzer};
    pub use crate::core::currency::{CurrencyCode, CurrencyPair, CurrencyUniverse, FxRateTable, RateProvider};
    pub use crate::core::market::{ContractTerms, MarketState, PricingError};
    pub use crate::core::snapshot::RateSnapshot;
    pub use crate::pricing::black_scholes::{analytic_crash_probability, call_price, PricingResult};
    pub use crate::simulation::monte_carlo::{simulate, SimulationConfig, SimulationResult};
}
