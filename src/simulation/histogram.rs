use crate::core::market::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bin count used for simulated rate distributions.
pub const DEFAULT_BINS: usize = 100;

const BAR_WIDTH: usize = 50;

/// Equal-width frequency histogram of a sample.
///
/// Bins cover `[min, max]`; the maximum falls into the last bin. A
/// degenerate sample (every value equal) produces one occupied bin.
///
/// # Examples
///
/// ```
/// use currency_run::simulation::histogram::Histogram;
///
/// let hist = Histogram::from_samples(&[1.0, 1.5, 2.0, 2.0], 2).unwrap();
/// assert_eq!(hist.counts(), &[1, 3]);
/// assert_eq!(hist.bin_of(1.2), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramData")]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<usize>,
    /// Optional value to highlight, such as the crash threshold.
    marker: Option<f64>,
}

/// Wire form of a [`Histogram`], checked before it becomes one.
#[derive(Deserialize)]
struct HistogramData {
    min: f64,
    max: f64,
    counts: Vec<usize>,
    #[serde(default)]
    marker: Option<f64>,
}

impl TryFrom<HistogramData> for Histogram {
    type Error = PricingError;

    fn try_from(data: HistogramData) -> Result<Self, PricingError> {
        if data.counts.is_empty() {
            return Err(PricingError::InvalidParameter {
                name: "bins",
                value: 0.0,
            });
        }
        for value in [data.min, data.max] {
            if !value.is_finite() {
                return Err(PricingError::NonFinite { name: "range", value });
            }
        }
        if data.min > data.max {
            return Err(PricingError::InvalidParameter {
                name: "range",
                value: data.max - data.min,
            });
        }
        Ok(Self {
            min: data.min,
            max: data.max,
            counts: data.counts,
            marker: data.marker,
        })
    }
}

impl Histogram {
    pub fn from_samples(samples: &[f64], bins: usize) -> Result<Self, PricingError> {
        if bins == 0 {
            return Err(PricingError::InvalidParameter {
                name: "bins",
                value: 0.0,
            });
        }
        if samples.is_empty() {
            return Err(PricingError::InvalidParameter {
                name: "samples",
                value: 0.0,
            });
        }

        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        if !(min.is_finite() && max.is_finite()) {
            return Err(PricingError::NonFinite {
                name: "sample",
                value: if min.is_finite() { max } else { min },
            });
        }

        let mut hist = Self {
            min,
            max,
            counts: vec![0; bins],
            marker: None,
        };
        for &x in samples {
            if let Some(bin) = hist.bin_of(x) {
                hist.counts[bin] += 1;
            }
        }
        Ok(hist)
    }

    /// Attach a marker value, drawn as a separate line when displayed.
    pub fn with_marker(mut self, value: f64) -> Self {
        self.marker = Some(value);
        self
    }

    pub fn marker(&self) -> Option<f64> {
        self.marker
    }

    /// Bin index containing `value`, or `None` if it lies outside the range.
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !(self.min..=self.max).contains(&value) {
            return None;
        }
        let width = self.bin_width();
        if width == 0.0 {
            return Some(0);
        }
        let idx = ((value - self.min) / width) as usize;
        Some(idx.min(self.counts.len() - 1))
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Lower and upper edge of bin `idx`.
    pub fn bin_range(&self, idx: usize) -> (f64, f64) {
        let width = self.bin_width();
        let lo = self.min + width * idx as f64;
        (lo, lo + width)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let marker_bin = self.marker.and_then(|m| self.bin_of(m));

        for (idx, &count) in self.counts.iter().enumerate() {
            let (lo, _) = self.bin_range(idx);
            let bar = "█".repeat(count * BAR_WIDTH / peak);
            let flag = if marker_bin == Some(idx) { " ◀ threshold" } else { "" };
            writeln!(f, "{:>12.6} | {:<width$} {}{}", lo, bar, count, flag, width = BAR_WIDTH)?;
        }
        if let (Some(m), None) = (self.marker, marker_bin) {
            writeln!(f, "threshold {:.6} lies outside the simulated range", m)?;
        }
        Ok(())
    }
}
