// =============================================================================
// Awesome Oscillator (AO)
// =============================================================================
//
//   AO = SMA(median, fast) - SMA(median, slow),   median = (H + L) / 2
//
// First result at bar `slow - 1`. Momentum compares each AO with the one
// before it.
// =============================================================================

use serde::Serialize;

use super::rolling::sma;
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Bias, Momentum, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AwesomeOscillatorResult {
    pub ao: f64,
    pub trend: Bias,
    pub momentum: Momentum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AwesomeOscillator {
    pub fast: usize,
    pub slow: usize,
}

impl Default for AwesomeOscillator {
    fn default() -> Self {
        Self { fast: 5, slow: 34 }
    }
}

impl AwesomeOscillator {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        let fast = params.period("fast", 5)?;
        let slow = params.period("slow", 34)?;
        if fast >= slow {
            return Err(IndicatorError::invalid_params(format!(
                "AO fast period ({fast}) must be below slow period ({slow})"
            )));
        }
        Ok(Self { fast, slow })
    }
}

impl Indicator for AwesomeOscillator {
    type Output = AwesomeOscillatorResult;

    fn name(&self) -> &'static str {
        "AO"
    }

    fn warmup(&self) -> usize {
        self.fast.max(self.slow).saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<AwesomeOscillatorResult> {
        let median = series.median_prices();
        let fast = sma(&median, self.fast);
        let slow = sma(&median, self.slow);
        if slow.is_empty() || self.fast > self.slow {
            return Vec::new();
        }
        let shift = self.slow - self.fast;

        let ao: Vec<f64> = slow
            .iter()
            .enumerate()
            .map(|(j, s)| fast[shift + j] - s)
            .collect();

        ao.iter()
            .enumerate()
            .map(|(j, &value)| AwesomeOscillatorResult {
                ao: value,
                trend: Bias::from_sign(value),
                momentum: match j.checked_sub(1) {
                    Some(prev) => Momentum::from_change(value - ao[prev], 0.0),
                    None => Momentum::Stable,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    #[test]
    fn rising_series_is_bullish() {
        let out = AwesomeOscillator::default()
            .calculate(&rising(60, 100.0, 1.0))
            .unwrap();
        assert_eq!(out.offset, 33);
        let last = out.latest().unwrap();
        // fast SMA leads slow SMA by (34 - 5) / 2 steps of 1.0
        assert!((last.ao - 14.5).abs() < 1e-9);
        assert_eq!(last.trend, Bias::Bullish);
    }

    #[test]
    fn first_value_has_stable_momentum() {
        let out = AwesomeOscillator::default().calculate(&wave(34)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.values[0].momentum, Momentum::Stable);
    }

    #[test]
    fn fast_must_be_below_slow() {
        let params = IndicatorParams::new().with("fast", 40.0);
        assert!(AwesomeOscillator::from_params(&params).is_err());
    }
}
