//! Black-Scholes-Merton valuation of a European FX call.
//!
//! The base-currency rate is treated as the underlying asset and follows
//! geometric Brownian motion under the risk-neutral measure:
//!
//! ```text
//! d1 = (ln(S/K) + (r + σ²/2)·T) / (σ·√T)
//! d2 = d1 − σ·√T
//! C  = S·Φ(d1) − K·e^(−rT)·Φ(d2)
//! ```

use crate::core::market::{ContractTerms, MarketState, PricingError};
use crate::pricing::norm_cdf;
use log::debug;
use serde::{Deserialize, Serialize};

/// Theoretical value of the call contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Non-negative fair value in quote currency per unit of base.
    pub fair_value: f64,
}

/// The `d1` and `d2` terms of the closed-form solution.
pub fn d1_d2(market: &MarketState, terms: &ContractTerms) -> (f64, f64) {
    let sigma_sqrt_t = market.volatility() * terms.maturity().sqrt();
    let drift = (market.risk_free_rate() + 0.5 * market.volatility().powi(2)) * terms.maturity();
    let d1 = ((market.spot() / terms.strike()).ln() + drift) / sigma_sqrt_t;
    (d1, d1 - sigma_sqrt_t)
}

/// Fair value of a European call.
///
/// Validation lives in [`MarketState`] and [`ContractTerms`], so any pair
/// of values reaching this function is already positive where required.
///
/// # Examples
///
/// ```
/// use currency_run::core::market::{ContractTerms, MarketState};
/// use currency_run::pricing::black_scholes::call_price;
///
/// let market = MarketState::new(100.0, 0.05, 0.2).unwrap();
/// let terms = ContractTerms::new(100.0, 1.0).unwrap();
/// let price = call_price(&market, &terms).fair_value;
/// assert!((price - 10.4506).abs() < 1e-3);
/// ```
pub fn call_price(market: &MarketState, terms: &ContractTerms) -> PricingResult {
    let (d1, d2) = d1_d2(market, terms);
    let discount = (-market.risk_free_rate() * terms.maturity()).exp();
    let value = market.spot() * norm_cdf(d1) - terms.strike() * discount * norm_cdf(d2);

    debug!("black-scholes: d1={:.6} d2={:.6} value={:.6}", d1, d2, value);

    // Round-off can push deep out-of-the-money values fractionally below zero.
    PricingResult {
        fair_value: value.max(0.0),
    }
}

/// Closed-form probability that the terminal rate ends below the strike.
///
/// Equal to `Φ(−d2)`; the Monte Carlo estimate converges to this value.
pub fn analytic_crash_probability(market: &MarketState, terms: &ContractTerms) -> f64 {
    let (_, d2) = d1_d2(market, terms);
    norm_cdf(-d2)
}

/// Price directly from scalars, validating each one first.
pub fn price_call(
    spot: f64,
    strike: f64,
    maturity: f64,
    risk_free_rate: f64,
    volatility: f64,
) -> Result<PricingResult, PricingError> {
    let market = MarketState::new(spot, risk_free_rate, volatility)?;
    let terms = ContractTerms::new(strike, maturity)?;
    Ok(call_price(&market, &terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scenario() -> (MarketState, ContractTerms) {
        (
            MarketState::new(1.10, 0.02, 0.15).unwrap(),
            ContractTerms::new(1.05, 0.5).unwrap(),
        )
    }

    #[test]
    fn test_reference_fx_scenario() {
        let (market, terms) = scenario();
        let price = call_price(&market, &terms);
        assert_abs_diff_eq!(price.fair_value, 0.081737, epsilon = 1e-5);
    }

    #[test]
    fn test_reference_d1_d2() {
        let (market, terms) = scenario();
        let (d1, d2) = d1_d2(&market, &terms);
        assert_abs_diff_eq!(d1, 0.585909, epsilon = 1e-5);
        assert_abs_diff_eq!(d2, 0.479843, epsilon = 1e-5);
    }

    #[test]
    fn test_textbook_equity_value() {
        let price = price_call(100.0, 100.0, 1.0, 0.05, 0.2).unwrap();
        assert_abs_diff_eq!(price.fair_value, 10.450584, epsilon = 1e-5);
    }

    #[test]
    fn test_at_the_money_reduction() {
        let market = MarketState::new(1.0, 0.02, 0.15).unwrap();
        let terms = ContractTerms::new(1.0, 0.5).unwrap();
        let (d1, d2) = d1_d2(&market, &terms);

        let sigma_sqrt_t = 0.15 * 0.5_f64.sqrt();
        assert_abs_diff_eq!(d1, (0.02 + 0.5 * 0.15 * 0.15) * 0.5 / sigma_sqrt_t, epsilon = 1e-12);

        let expected = norm_cdf(d1) - (-0.02 * 0.5_f64).exp() * norm_cdf(d2);
        assert_abs_diff_eq!(call_price(&market, &terms).fair_value, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(expected, 0.047246, epsilon = 1e-5);
    }

    #[test]
    fn test_vanishing_volatility_tends_to_intrinsic() {
        let intrinsic = 1.10 - 1.05 * (-0.02 * 0.5_f64).exp();
        let price = price_call(1.10, 1.05, 0.5, 0.02, 1e-6).unwrap();
        assert_abs_diff_eq!(price.fair_value, intrinsic, epsilon = 1e-9);

        let otm = price_call(1.00, 1.20, 0.5, 0.02, 1e-6).unwrap();
        assert_abs_diff_eq!(otm.fair_value, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_analytic_probability() {
        let (market, terms) = scenario();
        assert_abs_diff_eq!(analytic_crash_probability(&market, &terms), 0.315670, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            price_call(1.10, 1.05, 0.5, 0.02, 0.0),
            Err(PricingError::InvalidParameter { name: "volatility", .. })
        ));
        assert!(matches!(
            price_call(1.10, 1.05, 0.0, 0.02, 0.15),
            Err(PricingError::InvalidParameter { name: "maturity", .. })
        ));
        assert!(price_call(0.0, 1.05, 0.5, 0.02, 0.15).is_err());
        assert!(price_call(1.10, -1.05, 0.5, 0.02, 0.15).is_err());
    }

    #[test]
    fn test_negative_rate_allowed() {
        let price = price_call(1.10, 1.05, 0.5, -0.01, 0.15).unwrap();
        assert!(price.fair_value > 0.0);
    }
}
