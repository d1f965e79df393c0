// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running total starting at 0 on the first bar:
//   close > prevClose  => OBV += volume
//   close < prevClose  => OBV -= volume
//   otherwise          => unchanged
//
// Results start at bar 1 (the first delta). Trend compares each value with
// the previous cumulative value.
// =============================================================================

use serde::Serialize;

use super::divergence::{trailing_divergence, DIVERGENCE_LOOKBACK};
use super::Indicator;
use crate::types::{Divergence, PriceSeries, Strength};

const STRONG_OBV: f64 = 100_000.0;
const MODERATE_OBV: f64 = 50_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObvTrend {
    Rising,
    Falling,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObvSignal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObvResult {
    pub obv: f64,
    pub trend: ObvTrend,
    pub signal: ObvSignal,
    pub strength: Strength,
    pub divergence: Divergence,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Obv;

impl Indicator for Obv {
    type Output = ObvResult;

    fn name(&self) -> &'static str {
        "OBV"
    }

    fn warmup(&self) -> usize {
        1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<ObvResult> {
        let closes = series.closes();
        let cumulative = on_balance_volume(series);

        (1..cumulative.len())
            .map(|bar| {
                let obv = cumulative[bar];
                let (trend, signal) = match obv.partial_cmp(&cumulative[bar - 1]) {
                    Some(std::cmp::Ordering::Greater) => (ObvTrend::Rising, ObvSignal::Buy),
                    Some(std::cmp::Ordering::Less) => (ObvTrend::Falling, ObvSignal::Sell),
                    _ => (ObvTrend::Sideways, ObvSignal::Hold),
                };
                let strength = if obv.abs() > STRONG_OBV {
                    Strength::Strong
                } else if obv.abs() > MODERATE_OBV {
                    Strength::Moderate
                } else {
                    Strength::Weak
                };
                ObvResult {
                    obv,
                    trend,
                    signal,
                    strength,
                    divergence: trailing_divergence(
                        &closes,
                        &cumulative,
                        bar,
                        DIVERGENCE_LOOKBACK,
                        DIVERGENCE_LOOKBACK,
                    ),
                }
            })
            .collect()
    }
}

/// Cumulative OBV for every bar, 0 at bar 0.
fn on_balance_volume(series: &PriceSeries) -> Vec<f64> {
    let bars = series.bars();
    let mut result = Vec::with_capacity(bars.len());
    let mut obv = 0.0;
    if !bars.is_empty() {
        result.push(obv);
    }
    for pair in bars.windows(2) {
        let (prev, bar) = (&pair[0], &pair[1]);
        if bar.close > prev.close {
            obv += bar.volume;
        } else if bar.close < prev.close {
            obv -= bar.volume;
        }
        result.push(obv);
    }
    result
}
