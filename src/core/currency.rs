use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// ISO 4217-style currency code.
///
/// Codes are normalised to upper case on construction so that `"eur"`
/// and `"EUR"` identify the same currency.
///
/// # Examples
///
/// ```
/// use currency_run::core::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("eur");
/// assert_eq!(eur.as_str(), "EUR");
/// assert_ne!(eur, CurrencyCode::new("USD"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from FX rate lookups and currency handling.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("no FX rate available for {from} -> {to}")]
    RateNotFound {
        from: CurrencyCode,
        to: CurrencyCode,
    },
    #[error("FX rate must be positive and finite, got {rate} for {from} -> {to}")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
    },
    #[error("malformed currency pair '{0}', expected BASE/QUOTE")]
    MalformedPair(String),
    #[error("unknown currency code {0}")]
    UnknownCurrency(CurrencyCode),
    #[error("malformed rate response: {0}")]
    MalformedResponse(String),
}

/// A pair of currencies representing an exchange rate direction.
///
/// The rate of `EUR/USD` is the number of USD paid for one EUR.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }

    /// Parse `"EUR/USD"` (or the compact `"EURUSD"`) into a pair.
    ///
    /// ```
    /// use currency_run::core::currency::CurrencyPair;
    ///
    /// let pair = CurrencyPair::parse("gbp/jpy").unwrap();
    /// assert_eq!(pair.to_string(), "GBP/JPY");
    /// assert!(CurrencyPair::parse("USD/USD").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, FxError> {
        let trimmed = input.trim();
        let (base, quote) = match trimmed.split_once('/') {
            Some((b, q)) => (b.trim(), q.trim()),
            None if trimmed.len() == 6 && trimmed.is_ascii() => trimmed.split_at(3),
            None => return Err(FxError::MalformedPair(input.to_string())),
        };

        let valid = |code: &str| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(base) || !valid(quote) {
            return Err(FxError::MalformedPair(input.to_string()));
        }

        let pair = Self::new(CurrencyCode::new(base), CurrencyCode::new(quote));
        if pair.base == pair.quote {
            return Err(FxError::MalformedPair(input.to_string()));
        }
        Ok(pair)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// The pairs offered when no currency list is supplied.
pub fn default_pairs() -> Vec<CurrencyPair> {
    [("EUR", "USD"), ("GBP", "JPY"), ("USD", "JPY")]
        .iter()
        .map(|(b, q)| CurrencyPair::new(CurrencyCode::new(*b), CurrencyCode::new(*q)))
        .collect()
}

/// Caller-supplied set of currency codes a pair may be built from.
///
/// Typically obtained from a rate snapshot, so the selectable currencies
/// always match what the provider can actually quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyUniverse {
    codes: BTreeSet<CurrencyCode>,
}

impl CurrencyUniverse {
    pub fn new<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CurrencyCode>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.codes.contains(code)
    }

    /// Reject a pair that uses a code outside the universe.
    pub fn validate(&self, pair: &CurrencyPair) -> Result<(), FxError> {
        for code in [&pair.base, &pair.quote] {
            if !self.contains(code) {
                return Err(FxError::UnknownCurrency(code.clone()));
            }
        }
        Ok(())
    }

    /// Codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.codes.iter()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Source of spot rates for currency pairs.
///
/// Any failure means there is no usable spot; callers must not run the
/// pricing core on a missing rate.
pub trait RateProvider {
    fn spot(&self, pair: &CurrencyPair) -> Result<f64, FxError>;
}

/// In-memory FX rate table for manually quoted spots.
///
/// Stores direct rates and derives inverse rates on insertion. The CLI
/// serves `analyze --spot` through it.
///
/// # Examples
///
/// ```
/// use currency_run::core::currency::{CurrencyCode, CurrencyPair, FxRateTable, RateProvider};
///
/// let mut rates = FxRateTable::new();
/// rates.set_rate(CurrencyCode::new("EUR"), CurrencyCode::new("USD"), 1.10).unwrap();
///
/// let pair = CurrencyPair::parse("USD/EUR").unwrap();
/// let spot = rates.spot(&pair).unwrap();
/// assert!((spot - 1.0 / 1.10).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FxRateTable {
    /// Direct rates: (from, to) -> rate.
    rates: HashMap<(CurrencyCode, CurrencyCode), f64>,
}

impl FxRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a direct exchange rate: 1 unit of `from` = `rate` units of `to`.
    pub fn set_rate(&mut self, from: CurrencyCode, to: CurrencyCode, rate: f64) -> Result<(), FxError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(FxError::InvalidRate { from, to, rate });
        }
        self.rates.insert((from.clone(), to.clone()), rate);
        self.rates.insert((to, from), 1.0 / rate);
        Ok(())
    }

    /// Get the exchange rate from one currency to another.
    pub fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64, FxError> {
        if from == to {
            return Ok(1.0);
        }
        self.rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| FxError::RateNotFound {
                from: from.clone(),
                to: to.clone(),
            })
    }
}

impl RateProvider for FxRateTable {
    fn spot(&self, pair: &CurrencyPair) -> Result<f64, FxError> {
        self.get_rate(&pair.base, &pair.quote)
    }
}
