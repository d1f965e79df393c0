// =============================================================================
// Indicator parameter overrides
// =============================================================================
//
// A flat JSON object of numbers, e.g. `{"period": 21}` or
// `{"fast": 8, "slow": 21, "signal": 5}`. Unknown keys are ignored so callers
// can share one params object between several indicators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

/// Longest window a parameter override may ask for.
pub const MAX_PERIOD: usize = 100_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorParams(BTreeMap<String, f64>);

impl IndicatorParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A window length: positive and integral.
    ///
    /// # Edge cases
    /// - key absent => `default`
    /// - `0`, negative, fractional or non-finite => `InvalidParams`
    /// - above [`MAX_PERIOD`] => `InvalidParams`
    pub fn period(&self, key: &str, default: usize) -> Result<usize, IndicatorError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) if v > MAX_PERIOD as f64 => Err(IndicatorError::invalid_params(format!(
                "{key} must not exceed {MAX_PERIOD}, got {v}"
            ))),
            Some(v) if v.is_finite() && v >= 1.0 && v.fract() == 0.0 => Ok(v as usize),
            Some(v) => Err(IndicatorError::invalid_params(format!(
                "{key} must be a positive integer, got {v}"
            ))),
        }
    }

    /// A strictly positive real factor (band multipliers, SAR acceleration).
    pub fn factor(&self, key: &str, default: f64) -> Result<f64, IndicatorError> {
        match self.get(key) {
            None => Ok(default),
            Some(v) if v.is_finite() && v > 0.0 => Ok(v),
            Some(v) => Err(IndicatorError::invalid_params(format!(
                "{key} must be a positive number, got {v}"
            ))),
        }
    }
}

impl FromIterator<(String, f64)> for IndicatorParams {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
