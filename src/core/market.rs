use serde::Serialize;
use thiserror::Error;

/// Validation failures raised by the pricing and simulation core.
///
/// These are never corrected silently: any invalid input aborts the
/// computation before a result is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("invalid parameter {name}: {value} (must be positive and finite)")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("invalid parameter {name}: {value} (must be finite)")]
    NonFinite { name: &'static str, value: f64 },
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, PricingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PricingError::InvalidParameter { name, value })
    }
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, PricingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::NonFinite { name, value })
    }
}

/// Snapshot of the market for one currency pair.
///
/// `spot` is the quote-currency price of one unit of base currency.
/// `volatility` is the annualised standard deviation of log returns.
///
/// # Examples
///
/// ```
/// use currency_run::core::market::MarketState;
///
/// let market = MarketState::new(1.10, 0.02, 0.15).unwrap();
/// assert_eq!(market.spot(), 1.10);
/// assert!(MarketState::new(1.10, 0.02, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketState {
    spot: f64,
    risk_free_rate: f64,
    volatility: f64,
}

impl MarketState {
    /// Create a market snapshot.
    ///
    /// The risk-free rate may be zero or negative; spot and volatility
    /// must be strictly positive.
    pub fn new(spot: f64, risk_free_rate: f64, volatility: f64) -> Result<Self, PricingError> {
        Ok(Self {
            spot: require_positive("spot", spot)?,
            risk_free_rate: require_finite("risk_free_rate", risk_free_rate)?,
            volatility: require_positive("volatility", volatility)?,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }
}

/// Terms of the hypothetical European contract.
///
/// `strike` doubles as the currency-run threshold; `maturity` is in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContractTerms {
    strike: f64,
    maturity: f64,
}

impl ContractTerms {
    pub fn new(strike: f64, maturity: f64) -> Result<Self, PricingError> {
        Ok(Self {
            strike: require_positive("strike", strike)?,
            maturity: require_positive("maturity", maturity)?,
        })
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn maturity(&self) -> f64 {
        self.maturity
    }
}
