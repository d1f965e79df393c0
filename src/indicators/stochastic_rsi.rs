// =============================================================================
// Stochastic RSI
// =============================================================================
//
// Stochastic oscillator applied to the RSI line instead of price:
//
//   StochRSI = (RSI - min RSI) / (max RSI - min RSI) * 100   over `stoch` values
//   %K       = SMA(StochRSI, k)
//   %D       = SMA(%K, d)
//
// A flat RSI window gives 50. First result at bar
// `rsi + (stoch - 1) + (k - 1) + (d - 1)`.
// =============================================================================

use serde::Serialize;

use super::rolling::{highest, lowest, sma};
use super::rsi::calculate_rsi;
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{PriceSeries, ZoneSignal};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StochasticRsiResult {
    pub stoch_rsi: f64,
    pub k: f64,
    pub d: f64,
    pub signal: ZoneSignal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticRsi {
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub k_period: usize,
    pub d_period: usize,
}

impl Default for StochasticRsi {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stoch_period: 14,
            k_period: 3,
            d_period: 3,
        }
    }
}

impl StochasticRsi {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            rsi_period: params.period("rsi_period", 14)?,
            stoch_period: params.period("stoch_period", 14)?,
            k_period: params.period("k_period", 3)?,
            d_period: params.period("d_period", 3)?,
        })
    }
}

impl Indicator for StochasticRsi {
    type Output = StochasticRsiResult;

    fn name(&self) -> &'static str {
        "STOCH_RSI"
    }

    fn warmup(&self) -> usize {
        self.rsi_period
            .saturating_add(self.stoch_period)
            .saturating_add(self.k_period)
            .saturating_add(self.d_period)
            .saturating_sub(3)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<StochasticRsiResult> {
        let rsi = calculate_rsi(&series.closes(), self.rsi_period);

        let stoch: Vec<f64> = highest(&rsi, self.stoch_period)
            .into_iter()
            .zip(lowest(&rsi, self.stoch_period))
            .enumerate()
            .map(|(i, (max, min))| {
                if max == min {
                    50.0
                } else {
                    (rsi[self.stoch_period - 1 + i] - min) / (max - min) * 100.0
                }
            })
            .collect();

        let k_line = sma(&stoch, self.k_period);
        let d_line = sma(&k_line, self.d_period);

        let k_lead = self.d_period - 1;
        let stoch_lead = self.k_period - 1 + k_lead;

        d_line
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let stoch_rsi = stoch[stoch_lead + i];
                let signal = if stoch_rsi > 80.0 {
                    ZoneSignal::Overbought
                } else if stoch_rsi < 20.0 {
                    ZoneSignal::Oversold
                } else {
                    ZoneSignal::Neutral
                };
                StochasticRsiResult {
                    stoch_rsi,
                    k: k_line[k_lead + i],
                    d,
                    signal,
                }
            })
            .collect()
    }
}
