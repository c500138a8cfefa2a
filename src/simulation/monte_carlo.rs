//! Monte Carlo simulation of terminal exchange rates.
//!
//! Each draw samples the exact GBM terminal distribution in one step:
//!
//! ```text
//! S_T = S · exp((r − σ²/2)·T + σ·√T·z),   z ~ N(0, 1)
//! ```
//!
//! No intermediate path is generated, so only payoffs depending on `S_T`
//! alone can be evaluated from the output.

use crate::core::market::{ContractTerms, MarketState, PricingError};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

/// Sample count used when none is given.
pub const DEFAULT_SIMULATIONS: usize = 100_000;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of terminal rates to draw.
    pub simulations: usize,
    /// Fixed seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// A fresh generator for this configuration.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Simulated terminal rates and the derived crash probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    terminal_rates: Vec<f64>,
    threshold: f64,
    crash_probability: f64,
}

impl SimulationResult {
    /// Terminal rates in draw order.
    pub fn terminal_rates(&self) -> &[f64] {
        &self.terminal_rates
    }

    /// Threshold the crash probability was measured against.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Fraction of terminal rates strictly below the threshold.
    pub fn crash_probability(&self) -> f64 {
        self.crash_probability
    }

    pub fn len(&self) -> usize {
        self.terminal_rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminal_rates.is_empty()
    }

    /// Binomial standard error `√(p(1−p)/N)` of the crash probability.
    pub fn standard_error(&self) -> f64 {
        let p = self.crash_probability;
        (p * (1.0 - p) / self.len() as f64).sqrt()
    }

    pub fn summary(&self) -> DistributionSummary {
        DistributionSummary::from_samples(&self.terminal_rates)
    }
}

/// Descriptive statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistributionSummary {
    /// Summarise a sample; an empty sample yields all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));

        Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Draw `simulations` terminal rates and measure how often they end below
/// the contract strike.
///
/// The generator is borrowed from the caller; seeding it fixes the output.
/// Draws that leave the `f64` range are clamped to `[f64::MIN_POSITIVE,
/// f64::MAX]`, so every terminal rate stays strictly positive and finite.
///
/// # Examples
///
/// ```
/// use currency_run::core::market::{ContractTerms, MarketState};
/// use currency_run::simulation::monte_carlo::simulate;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let market = MarketState::new(1.10, 0.02, 0.15).unwrap();
/// let terms = ContractTerms::new(1.05, 0.5).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
///
/// let result = simulate(&market, &terms, 10_000, &mut rng).unwrap();
/// assert_eq!(result.len(), 10_000);
/// assert!(result.crash_probability() > 0.25 && result.crash_probability() < 0.38);
/// ```
pub fn simulate<R: Rng + ?Sized>(
    market: &MarketState,
    terms: &ContractTerms,
    simulations: usize,
    rng: &mut R,
) -> Result<SimulationResult, PricingError> {
    if simulations == 0 {
        return Err(PricingError::InvalidParameter {
            name: "simulations",
            value: 0.0,
        });
    }

    let sigma = market.volatility();
    let maturity = terms.maturity();
    let drift = (market.risk_free_rate() - 0.5 * sigma * sigma) * maturity;
    let diffusion = sigma * maturity.sqrt();
    let spot = market.spot();
    let threshold = terms.strike();

    let mut below = 0usize;
    let terminal_rates: Vec<f64> = (0..simulations)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut *rng);
            let rate = (spot * (drift + diffusion * z).exp()).clamp(f64::MIN_POSITIVE, f64::MAX);
            if rate < threshold {
                below += 1;
            }
            rate
        })
        .collect();

    let crash_probability = below as f64 / simulations as f64;
    debug!(
        "simulated {} terminal rates: {} below threshold {:.6} (p={:.6})",
        simulations, below, threshold, crash_probability
    );

    Ok(SimulationResult {
        terminal_rates,
        threshold,
        crash_probability,
    })
}

/// Run a simulation with a generator built from `config`.
pub fn run_simulation(
    market: &MarketState,
    terms: &ContractTerms,
    config: &SimulationConfig,
) -> Result<SimulationResult, PricingError> {
    let mut rng = config.rng();
    simulate(market, terms, config.simulations, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::black_scholes::analytic_crash_probability;
    use approx::assert_abs_diff_eq;

    fn scenario() -> (MarketState, ContractTerms) {
        (
            MarketState::new(1.10, 0.02, 0.15).unwrap(),
            ContractTerms::new(1.05, 0.5).unwrap(),
        )
    }

    #[test]
    fn test_zero_samples_rejected() {
        let (market, terms) = scenario();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            simulate(&market, &terms, 0, &mut rng).unwrap_err(),
            PricingError::InvalidParameter {
                name: "simulations",
                value: 0.0
            }
        );
    }

    #[test]
    fn test_single_sample() {
        let (market, terms) = scenario();
        let mut rng = StdRng::seed_from_u64(1);
        let result = simulate(&market, &terms, 1, &mut rng).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result.crash_probability() == 0.0 || result.crash_probability() == 1.0);
    }

    #[test]
    fn test_terminal_rates_positive() {
        let market = MarketState::new(0.0065, 0.0, 0.9).unwrap();
        let terms = ContractTerms::new(0.006, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let result = simulate(&market, &terms, 50_000, &mut rng).unwrap();
        assert!(result.terminal_rates().iter().all(|&r| r > 0.0));
    }

    #[test]
    fn test_extreme_volatility_stays_positive() {
        let market = MarketState::new(1.10, 0.02, 8.0).unwrap();
        let terms = ContractTerms::new(1.05, 30.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let result = simulate(&market, &terms, 1_000, &mut rng).unwrap();

        assert!(result.terminal_rates().iter().all(|&r| r > 0.0 && r.is_finite()));
        assert_eq!(result.crash_probability(), 1.0);
    }

    #[test]
    fn test_same_seed_same_output() {
        let (market, terms) = scenario();
        let config = SimulationConfig {
            simulations: 5_000,
            seed: Some(42),
        };
        let a = run_simulation(&market, &terms, &config).unwrap();
        let b = run_simulation(&market, &terms, &config).unwrap();
        assert_eq!(a.terminal_rates(), b.terminal_rates());
        assert_eq!(a.crash_probability(), b.crash_probability());
    }

    #[test]
    fn test_different_seeds_differ() {
        let (market, terms) = scenario();
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        let a = simulate(&market, &terms, 100, &mut rng_a).unwrap();
        let b = simulate(&market, &terms, 100, &mut rng_b).unwrap();
        assert_ne!(a.terminal_rates(), b.terminal_rates());
    }

    #[test]
    fn test_converges_to_analytic_probability() {
        let (market, terms) = scenario();
        let mut rng = StdRng::seed_from_u64(2024);
        let result = simulate(&market, &terms, 200_000, &mut rng).unwrap();
        let analytic = analytic_crash_probability(&market, &terms);
        assert_abs_diff_eq!(result.crash_probability(), analytic, epsilon = 0.01);
    }

    #[test]
    fn test_sample_mean_is_forward() {
        let (market, terms) = scenario();
        let mut rng = StdRng::seed_from_u64(99);
        let result = simulate(&market, &terms, 200_000, &mut rng).unwrap();
        let forward = 1.10 * (0.02 * 0.5_f64).exp();
        assert_abs_diff_eq!(result.summary().mean, forward, epsilon = 0.002);
    }

    #[test]
    fn test_standard_error() {
        let (market, terms) = scenario();
        let mut rng = StdRng::seed_from_u64(5);
        let result = simulate(&market, &terms, 10_000, &mut rng).unwrap();
        let p = result.crash_probability();
        assert_abs_diff_eq!(result.standard_error(), (p * (1.0 - p) / 10_000.0).sqrt());
        assert!(result.standard_error() < 0.01);
    }

    #[test]
    fn test_summary_of_known_sample() {
        let summary = DistributionSummary::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_abs_diff_eq!(summary.mean, 2.5);
        assert_abs_diff_eq!(summary.std_dev, 1.25_f64.sqrt());
    }

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulations, DEFAULT_SIMULATIONS);
        assert_eq!(config.seed, None);
    }
}
