// =============================================================================
// Average True Range (ATR) - Wilder's Smoothing Method
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is then the smoothed average of TR using Wilder's method:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Signal bands on ATR as a percentage of close:
//   >= 3%  => HIGH_VOLATILITY
//   <= 1%  => LOW_VOLATILITY
// =============================================================================

use serde::Serialize;

use super::rolling::{true_ranges, wilder};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{PriceBar, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtrSignal {
    HighVolatility,
    LowVolatility,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtrResult {
    pub atr: f64,
    /// ATR relative to the bar's close, in percent. 0 when the close is 0.
    pub atr_percent: f64,
    pub signal: AtrSignal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atr {
    pub period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 14)?,
        })
    }
}

impl Indicator for Atr {
    type Output = AtrResult;

    fn name(&self) -> &'static str {
        "ATR"
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<AtrResult> {
        let bars = series.bars();
        calculate_atr(bars, self.period)
            .into_iter()
            .enumerate()
            .map(|(i, atr)| {
                let close = bars[self.period + i].close;
                let atr_percent = if close == 0.0 { 0.0 } else { atr / close * 100.0 };
                let signal = if atr_percent >= 3.0 {
                    AtrSignal::HighVolatility
                } else if atr_percent <= 1.0 {
                    AtrSignal::LowVolatility
                } else {
                    AtrSignal::Normal
                };
                AtrResult {
                    atr,
                    atr_percent,
                    signal,
                }
            })
            .collect()
    }
}

/// Wilder ATR for every bar from index `period`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - fewer than `period + 1` bars => empty vec (each TR needs a previous bar)
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return Vec::new();
    }
    wilder(&true_ranges(bars), period)
}
