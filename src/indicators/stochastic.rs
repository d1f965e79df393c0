// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
// Step 1 - Raw %K over `k_period` bars:
//            %K = (close - lowestLow) / (highestHigh - lowestLow) * 100
//          50 when the window has zero range.
// Step 2 - Slow %K = trailing mean of raw %K over `slowing` (disabled when
//          `slowing <= 1`).
// Step 3 - %D = trailing mean of slow %K over `d_period`.
//
// First result at bar `k_period - 1 + (slowing - 1) + (d_period - 1)`.
// =============================================================================

use serde::Serialize;

use super::divergence::{trailing_divergence, DIVERGENCE_LOOKBACK};
use super::rolling::{highest, lowest, sma};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Crossover, Divergence, Momentum, PriceSeries, ZonePosition, ZoneSignal};

/// %K change across the last 3 values that counts as momentum.
const MOMENTUM_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StochasticResult {
    pub k_percent: f64,
    pub d_percent: f64,
    /// Banding of `(K + D) / 2`.
    pub signal: ZoneSignal,
    /// %K versus %D since the previous bar.
    pub crossover: Crossover,
    pub position: ZonePosition,
    pub divergence: Divergence,
    pub momentum: Momentum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k_period: usize,
    pub d_period: usize,
    pub slowing: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            slowing: 3,
        }
    }
}

impl Stochastic {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            k_period: params.period("k_period", 14)?,
            d_period: params.period("d_period", 3)?,
            slowing: params.period("slowing", 3)?,
        })
    }

    fn effective_slowing(&self) -> usize {
        self.slowing.max(1)
    }
}

impl Indicator for Stochastic {
    type Output = StochasticResult;

    fn name(&self) -> &'static str {
        "STOCHASTIC"
    }

    fn warmup(&self) -> usize {
        self.k_period
            .saturating_add(self.effective_slowing())
            .saturating_add(self.d_period)
            .saturating_sub(3)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<StochasticResult> {
        let closes = series.closes();
        let raw_k = raw_percent_k(&closes, &series.highs(), &series.lows(), self.k_period);
        let slow_k = sma(&raw_k, self.effective_slowing());
        let d_values = sma(&slow_k, self.d_period);
        if d_values.is_empty() {
            return Vec::new();
        }

        // slow_k[j] belongs to bar `slow_k_start + j`.
        let slow_k_start = self.k_period - 1 + self.effective_slowing() - 1;
        let aligned_closes = &closes[slow_k_start..];
        let lead = self.d_period - 1;

        let mut results: Vec<StochasticResult> = Vec::with_capacity(d_values.len());
        for (i, &d) in d_values.iter().enumerate() {
            let j = lead + i;
            let k = slow_k[j];

            let crossover = match results.last() {
                Some(prev) => Crossover::detect(prev.k_percent, prev.d_percent, k, d),
                None => Crossover::None,
            };
            let momentum = if j >= 2 {
                Momentum::from_change(k - slow_k[j - 2], MOMENTUM_THRESHOLD)
            } else {
                Momentum::Stable
            };

            results.push(StochasticResult {
                k_percent: k,
                d_percent: d,
                signal: signal(k, d),
                crossover,
                position: position(k),
                divergence: trailing_divergence(
                    aligned_closes,
                    &slow_k,
                    j,
                    DIVERGENCE_LOOKBACK,
                    DIVERGENCE_LOOKBACK,
                ),
                momentum,
            });
        }
        results
    }
}

/// Raw %K for every bar from `period - 1`.
fn raw_percent_k(closes: &[f64], highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
    highest(highs, period)
        .into_iter()
        .zip(lowest(lows, period))
        .enumerate()
        .map(|(i, (hh, ll))| {
            if hh == ll {
                50.0
            } else {
                (closes[period - 1 + i] - ll) / (hh - ll) * 100.0
            }
        })
        .collect()
}

fn signal(k: f64, d: f64) -> ZoneSignal {
    let avg = (k + d) / 2.0;
    if avg <= 20.0 {
        ZoneSignal::Oversold
    } else if avg >= 80.0 {
        ZoneSignal::Overbought
    } else {
        ZoneSignal::Neutral
    }
}

fn position(k: f64) -> ZonePosition {
    if k <= 10.0 {
        ZonePosition::ExtremeOversold
    } else if k <= 20.0 {
        ZonePosition::Oversold
    } else if k >= 90.0 {
        ZonePosition::ExtremeOverbought
    } else if k >= 80.0 {
        ZonePosition::Overbought
    } else {
        ZonePosition::Neutral
    }
}
