//! Rate snapshots in the ExchangeRate-API `latest` response format.
//!
//! ```json
//! {
//!   "result": "success",
//!   "base_code": "USD",
//!   "conversion_rates": { "USD": 1, "EUR": 0.9091, "JPY": 151.2 }
//! }
//! ```
//!
//! Every rate in `conversion_rates` is quoted as units of that currency
//! per one unit of `base_code`.

use crate::core::currency::{CurrencyCode, CurrencyPair, CurrencyUniverse, FxError, RateProvider};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BASE_RATE_TOLERANCE: f64 = 1e-12;

#[derive(Deserialize)]
struct LatestResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    base_code: Option<String>,
    conversion_rates: Option<BTreeMap<String, f64>>,
}

/// Conversion rates for one base currency at one point in time.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateSnapshot {
    /// Build a snapshot from already-parsed rates.
    ///
    /// The base currency is quoted at 1; a listed base rate other than 1
    /// is a `MalformedResponse`.
    pub fn new(base: CurrencyCode, rates: impl IntoIterator<Item = (CurrencyCode, f64)>) -> Result<Self, FxError> {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(FxError::InvalidRate {
                    from: base.clone(),
                    to: code,
                    rate,
                });
            }
            if code == base && (rate - 1.0).abs() > BASE_RATE_TOLERANCE {
                return Err(FxError::MalformedResponse(format!(
                    "base {} quoted at {} instead of 1",
                    base, rate
                )));
            }
            table.insert(code, rate);
        }
        table.insert(base.clone(), 1.0);
        Ok(Self { base, rates: table })
    }

    /// Parse an ExchangeRate-API JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, FxError> {
        let response: LatestResponse =
            serde_json::from_str(payload).map_err(|e| FxError::MalformedResponse(e.to_string()))?;

        if let Some(result) = response.result.as_deref() {
            if result != "success" {
                let reason = response.error_type.unwrap_or_else(|| result.to_string());
                return Err(FxError::MalformedResponse(format!("provider reported error: {}", reason)));
            }
        }

        let base = response
            .base_code
            .ok_or_else(|| FxError::MalformedResponse("missing base_code".to_string()))?;
        let rates = response
            .conversion_rates
            .ok_or_else(|| FxError::MalformedResponse("missing conversion_rates".to_string()))?;

        let snapshot = Self::new(
            CurrencyCode::new(base),
            rates.into_iter().map(|(code, rate)| (CurrencyCode::new(code), rate)),
        )?;
        debug!(
            "loaded rate snapshot: base {} with {} currencies",
            snapshot.base,
            snapshot.rates.len()
        );
        Ok(snapshot)
    }

    /// Read and parse a snapshot file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FxError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FxError::MalformedResponse(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Currencies quotable from this snapshot.
    pub fn universe(&self) -> CurrencyUniverse {
        CurrencyUniverse::new(self.rates.keys().cloned())
    }

    fn per_base(&self, code: &CurrencyCode) -> Result<f64, FxError> {
        self.rates.get(code).copied().ok_or_else(|| FxError::RateNotFound {
            from: self.base.clone(),
            to: code.clone(),
        })
    }
}

impl RateProvider for RateSnapshot {
    /// Direct, inverse and cross rates all reduce to
    /// `rate(quote) / rate(base)` since the snapshot base is quoted at 1.
    fn spot(&self, pair: &CurrencyPair) -> Result<f64, FxError> {
        let base = self.per_base(&pair.base).map_err(|_| FxError::RateNotFound {
            from: pair.base.clone(),
            to: pair.quote.clone(),
        })?;
        let quote = self.per_base(&pair.quote).map_err(|_| FxError::RateNotFound {
            from: pair.base.clone(),
            to: pair.quote.clone(),
        })?;
        Ok(quote / base)
    }
}
