use crate::core::market::{ContractTerms, MarketState, PricingError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Risk-free rate applied when the caller does not override it.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// How the strike is chosen relative to the live spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StrikeSpec {
    /// Strike as a multiple of spot, e.g. `0.95` for 5% below spot.
    FractionOfSpot(f64),
    /// Strike as an absolute exchange rate.
    Absolute(f64),
}

impl StrikeSpec {
    pub fn resolve(&self, spot: f64) -> f64 {
        match *self {
            StrikeSpec::FractionOfSpot(fraction) => spot * fraction,
            StrikeSpec::Absolute(strike) => strike,
        }
    }
}

impl Default for StrikeSpec {
    fn default() -> Self {
        StrikeSpec::FractionOfSpot(0.95)
    }
}

/// User-chosen scenario parameters.
///
/// Volatility is held in percent, the unit analysts enter it in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    pub strike: StrikeSpec,
    /// Years until expiry.
    pub maturity: f64,
    /// Annualised implied volatility in percent.
    pub volatility_pct: f64,
    pub risk_free_rate: f64,
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            strike: StrikeSpec::default(),
            maturity: 0.5,
            volatility_pct: 15.0,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl ScenarioInputs {
    /// Volatility as a fraction.
    pub fn volatility(&self) -> f64 {
        self.volatility_pct / 100.0
    }

    /// Build the validated core inputs for a given spot.
    pub fn to_market(&self, spot: f64) -> Result<(MarketState, ContractTerms), PricingError> {
        let market = MarketState::new(spot, self.risk_free_rate, self.volatility())?;
        let terms = ContractTerms::new(self.strike.resolve(spot), self.maturity)?;
        Ok((market, terms))
    }
}

/// An input outside the range the parameter source allows.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name} = {value} is outside the allowed range [{min}, {max}]")]
pub struct BoundsViolation {
    pub name: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Inclusive ranges accepted for interactive inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    /// Strike relative to spot.
    pub strike_fraction: (f64, f64),
    /// Maturity in years.
    pub maturity: (f64, f64),
    /// Volatility in percent.
    pub volatility_pct: (f64, f64),
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            strike_fraction: (0.8, 1.2),
            maturity: (0.1, 2.0),
            volatility_pct: (5.0, 50.0),
        }
    }
}

impl ParameterBounds {
    /// Unbounded ranges; only the core's own validation applies.
    pub fn unbounded() -> Self {
        let all = (f64::NEG_INFINITY, f64::INFINITY);
        Self {
            strike_fraction: all,
            maturity: all,
            volatility_pct: all,
        }
    }

    pub fn check(&self, inputs: &ScenarioInputs, spot: f64) -> Result<(), BoundsViolation> {
        let fraction = match inputs.strike {
            StrikeSpec::FractionOfSpot(fraction) => fraction,
            StrikeSpec::Absolute(strike) => strike / spot,
        };
        within("strike_fraction", fraction, self.strike_fraction)?;
        within("maturity", inputs.maturity, self.maturity)?;
        within("volatility_pct", inputs.volatility_pct, self.volatility_pct)?;
        Ok(())
    }
}

fn within(name: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), BoundsViolation> {
    // NaN fails both comparisons and is rejected here.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(BoundsViolation { name, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_defaults_match_controls() {
        let inputs = ScenarioInputs::default();
        assert_eq!(inputs.strike, StrikeSpec::FractionOfSpot(0.95));
        assert_eq!(inputs.maturity, 0.5);
        assert_abs_diff_eq!(inputs.volatility(), 0.15);
        assert_eq!(inputs.risk_free_rate, 0.02);
        assert!(ParameterBounds::default().check(&inputs, 1.10).is_ok());
    }

    #[test]
    fn test_strike_resolution() {
        assert_abs_diff_eq!(StrikeSpec::FractionOfSpot(0.9).resolve(150.0), 135.0);
        assert_eq!(StrikeSpec::Absolute(1.05).resolve(1.10), 1.05);
    }

    #[test]
    fn test_to_market() {
        let (market, terms) = ScenarioInputs::default().to_market(1.10).unwrap();
        assert_eq!(market.spot(), 1.10);
        assert_abs_diff_eq!(terms.strike(), 1.045, epsilon = 1e-12);
        assert_eq!(terms.maturity(), 0.5);
    }

    #[test]
    fn test_to_market_rejects_zero_volatility() {
        let inputs = ScenarioInputs {
            volatility_pct: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            inputs.to_market(1.10),
            Err(PricingError::InvalidParameter { name: "volatility", .. })
        ));
    }

    #[test]
    fn test_bounds_violations() {
        let bounds = ParameterBounds::default();

        let long = ScenarioInputs {
            maturity: 3.0,
            ..Default::default()
        };
        let err = bounds.check(&long, 1.10).unwrap_err();
        assert_eq!(err.name, "maturity");

        let far_strike = ScenarioInputs {
            strike: StrikeSpec::Absolute(2.0),
            ..Default::default()
        };
        assert_eq!(bounds.check(&far_strike, 1.10).unwrap_err().name, "strike_fraction");

        let calm = ScenarioInputs {
            volatility_pct: 1.0,
            ..Default::default()
        };
        assert_eq!(bounds.check(&calm, 1.10).unwrap_err().name, "volatility_pct");
    }

    #[test]
    fn test_unbounded_accepts_anything_finite() {
        let inputs = ScenarioInputs {
            maturity: 30.0,
            volatility_pct: 300.0,
            strike: StrikeSpec::FractionOfSpot(5.0),
            ..Default::default()
        };
        assert!(ParameterBounds::unbounded().check(&inputs, 1.0).is_ok());
    }
}
