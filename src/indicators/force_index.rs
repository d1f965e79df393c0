// =============================================================================
// Force Index
// =============================================================================
//
//   raw_t = (close_t - close_{t-1}) * volume_t
//
// With `period > 1` the raw series is EMA-smoothed. Either way the first
// result belongs to bar `period`.
// =============================================================================

use serde::Serialize;

use super::rolling::ema;
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Bias, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceIndexResult {
    pub force_index: f64,
    pub trend: Bias,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceIndex {
    pub period: usize,
}

impl Default for ForceIndex {
    fn default() -> Self {
        Self { period: 1 }
    }
}

impl ForceIndex {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 1)?,
        })
    }
}

impl Indicator for ForceIndex {
    type Output = ForceIndexResult;

    fn name(&self) -> &'static str {
        "FORCE_INDEX"
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<ForceIndexResult> {
        let raw: Vec<f64> = series
            .bars()
            .windows(2)
            .map(|pair| (pair[1].close - pair[0].close) * pair[1].volume)
            .collect();

        let values = if self.period > 1 {
            ema(&raw, self.period)
        } else {
            raw
        };

        values
            .into_iter()
            .map(|force_index| ForceIndexResult {
                force_index,
                trend: Bias::from_sign(force_index),
            })
            .collect()
    }
}
