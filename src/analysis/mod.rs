//! End-to-end currency-run workflow.
//!
//! Obtains a spot from a [`RateProvider`], checks the scenario inputs,
//! runs the pricer and the simulator on the same market snapshot and
//! bundles everything into a [`RiskReport`].

pub mod inputs;
pub mod report;

use crate::core::currency::{CurrencyPair, CurrencyUniverse, FxError, RateProvider};
use crate::core::market::PricingError;
use crate::pricing::black_scholes::{analytic_crash_probability, call_price};
use crate::simulation::histogram::{Histogram, DEFAULT_BINS};
use crate::simulation::monte_carlo::{simulate, SimulationConfig};
use chrono::Utc;
use inputs::{BoundsViolation, ParameterBounds, ScenarioInputs};
use log::{info, warn};
use rand::Rng;
use report::RiskReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of the analysis workflow.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no usable spot rate for {pair}: {source}")]
    UpstreamUnavailable {
        pair: CurrencyPair,
        #[source]
        source: FxError,
    },
    #[error(transparent)]
    Currency(#[from] FxError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    OutOfBounds(#[from] BoundsViolation),
}

/// Settings shared by every scenario an analyzer runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub simulation: SimulationConfig,
    /// Histogram bin count for the simulated distribution.
    pub bins: usize,
    pub bounds: ParameterBounds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            bins: DEFAULT_BINS,
            bounds: ParameterBounds::default(),
        }
    }
}

/// Price and simulate one scenario for a known spot.
///
/// The caller owns the generator; pass a seeded one for reproducible
/// output.
pub fn evaluate_scenario<R: Rng + ?Sized>(
    pair: Option<&CurrencyPair>,
    spot: f64,
    inputs: &ScenarioInputs,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<RiskReport, AnalysisError> {
    let (market, terms) = inputs.to_market(spot)?;
    config.bounds.check(inputs, spot)?;

    let pricing = call_price(&market, &terms);
    let analytic_probability = analytic_crash_probability(&market, &terms);
    let simulation = simulate(&market, &terms, config.simulation.simulations, rng)?;
    let histogram = Histogram::from_samples(simulation.terminal_rates(), config.bins)?.with_marker(terms.strike());

    info!(
        "scenario spot={:.6} strike={:.6} T={} sigma={}: price={:.6} p_run={:.4}",
        spot,
        terms.strike(),
        terms.maturity(),
        market.volatility(),
        pricing.fair_value,
        simulation.crash_probability()
    );

    Ok(RiskReport {
        pair: pair.cloned(),
        spot,
        strike: terms.strike(),
        maturity: terms.maturity(),
        volatility: market.volatility(),
        risk_free_rate: market.risk_free_rate(),
        fair_value: pricing.fair_value,
        crash_probability: simulation.crash_probability(),
        standard_error: simulation.standard_error(),
        analytic_probability,
        simulations: simulation.len(),
        seed: config.simulation.seed,
        summary: simulation.summary(),
        histogram,
        generated_at: Utc::now(),
    })
}

/// Runs scenarios against spots from a rate provider.
pub struct RiskAnalyzer<P> {
    provider: P,
    universe: Option<CurrencyUniverse>,
    config: AnalysisConfig,
}

impl<P: RateProvider> RiskAnalyzer<P> {
    pub fn new(provider: P, config: AnalysisConfig) -> Self {
        Self {
            provider,
            universe: None,
            config,
        }
    }

    /// Restrict pairs to the given currencies.
    pub fn with_universe(mut self, universe: CurrencyUniverse) -> Self {
        self.universe = Some(universe);
        self
    }

    /// Spot for `pair`, or `UpstreamUnavailable` if none can be used.
    pub fn spot(&self, pair: &CurrencyPair) -> Result<f64, AnalysisError> {
        if let Some(universe) = &self.universe {
            universe.validate(pair)?;
        }
        self.provider.spot(pair).map_err(|source| {
            warn!("no spot rate for {}: {}", pair, source);
            AnalysisError::UpstreamUnavailable {
                pair: pair.clone(),
                source,
            }
        })
    }

    /// Analyse `pair` with an explicitly supplied generator.
    pub fn analyze_with_rng<R: Rng + ?Sized>(
        &self,
        pair: &CurrencyPair,
        inputs: &ScenarioInputs,
        rng: &mut R,
    ) -> Result<RiskReport, AnalysisError> {
        let spot = self.spot(pair)?;
        evaluate_scenario(Some(pair), spot, inputs, &self.config, rng)
    }

    /// Analyse `pair` with a generator built from the configured seed.
    pub fn analyze(&self, pair: &CurrencyPair, inputs: &ScenarioInputs) -> Result<RiskReport, AnalysisError> {
        let mut rng = self.config.simulation.rng();
        self.analyze_with_rng(pair, inputs, &mut rng)
    }
}
