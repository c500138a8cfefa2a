use crate::core::currency::CurrencyPair;
use crate::simulation::histogram::Histogram;
use crate::simulation::monte_carlo::DistributionSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a presentation layer needs to show one currency-run scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// Pair the spot was quoted for, when it came from a rate provider.
    pub pair: Option<CurrencyPair>,
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    /// Black-Scholes call value.
    pub fair_value: f64,
    /// Simulated probability that the rate ends below the strike.
    pub crash_probability: f64,
    pub standard_error: f64,
    /// Closed-form counterpart of `crash_probability`.
    pub analytic_probability: f64,
    pub simulations: usize,
    pub seed: Option<u64>,
    pub summary: DistributionSummary,
    pub histogram: Histogram,
    pub generated_at: DateTime<Utc>,
}

impl RiskReport {
    /// Gap between the simulated and closed-form probabilities.
    pub fn sampling_gap(&self) -> f64 {
        (self.crash_probability - self.analytic_probability).abs()
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Currency Run Analysis ===")?;
        if let Some(pair) = &self.pair {
            writeln!(f, "Pair:                  {}", pair)?;
        }
        writeln!(f, "Current FX Rate:       {:.4}", self.spot)?;
        writeln!(f, "Strike / Threshold:    {:.4}", self.strike)?;
        writeln!(f, "Maturity:              {:.2} years", self.maturity)?;
        writeln!(f, "Volatility:            {:.1}%", self.volatility * 100.0)?;
        writeln!(f, "Risk-free Rate:        {:.2}%", self.risk_free_rate * 100.0)?;

        writeln!(f, "\nBlack-Scholes Call Price: {:.4}", self.fair_value)?;
        writeln!(
            f,
            "Probability of a Currency Run: {:.2}% (± {:.2}%, {} paths)",
            self.crash_probability * 100.0,
            self.standard_error * 100.0,
            self.simulations
        )?;
        writeln!(f, "Closed-form Probability:       {:.2}%", self.analytic_probability * 100.0)?;

        writeln!(f, "\nSimulated Distribution:")?;
        writeln!(f, "  Min:     {:.6}", self.summary.min)?;
        writeln!(f, "  Max:     {:.6}", self.summary.max)?;
        writeln!(f, "  Mean:    {:.6}", self.summary.mean)?;
        writeln!(f, "  Std Dev: {:.6}", self.summary.std_dev)?;

        writeln!(f, "\n{}", self.histogram)
    }
}
