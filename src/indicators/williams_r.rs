// =============================================================================
// Williams %R
// =============================================================================
//
//   %R = (highestHigh - close) / (highestHigh - lowestLow) * -100
//
// over `period` bars, -50 for a zero-range window. Range is [-100, 0].
//
// Derived per bar from the trailing %R history:
//   momentum        - mean of the newer half vs the older half of the last 6
//                     values (+-10 => BULLISH / BEARISH)
//   reversal_signal - STRONG when the last 3 values climb monotonically out of
//                     oversold (<= -80, <= -70, >= -60) or fall out of
//                     overbought (>= -20, >= -30, <= -40); WEAK on a looser
//                     one-sided move
//   trend_strength  - stddev of up to 10 %R values plus close-range volatility
//   divergence      - shared extrema utility over up to 10 values (min 6)
// =============================================================================

use serde::Serialize;

use super::divergence::{trailing_divergence, DIVERGENCE_LOOKBACK};
use super::rolling::{highest, lowest, mean, std_dev};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Bias, Divergence, PriceSeries, Strength, ZonePosition, ZoneSignal};

const MOMENTUM_WINDOW: usize = 6;
const MOMENTUM_THRESHOLD: f64 = 10.0;
const TREND_LOOKBACK: usize = 10;
const MIN_DIVERGENCE_POINTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversalSignal {
    StrongReversal,
    WeakReversal,
    NoReversal,
}

impl ReversalSignal {
    pub fn is_reversal(self) -> bool {
        self != Self::NoReversal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WilliamsRResult {
    pub williams_r: f64,
    pub signal: ZoneSignal,
    pub position: ZonePosition,
    pub momentum: Bias,
    pub reversal_signal: ReversalSignal,
    pub trend_strength: Strength,
    pub divergence: Divergence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WilliamsR {
    pub period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl WilliamsR {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 14)?,
        })
    }
}

impl Indicator for WilliamsR {
    type Output = WilliamsRResult;

    fn name(&self) -> &'static str {
        "WILLIAMS_R"
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<WilliamsRResult> {
        let closes = series.closes();
        let wr = percent_r(&closes, &series.highs(), &series.lows(), self.period);
        let offset = self.warmup();
        let aligned_closes = &closes[offset..];

        wr.iter()
            .enumerate()
            .map(|(j, &value)| {
                let bar = offset + j;
                WilliamsRResult {
                    williams_r: value,
                    signal: signal(value),
                    position: position(value),
                    momentum: momentum(&wr[j.saturating_sub(MOMENTUM_WINDOW - 1)..=j]),
                    reversal_signal: reversal(&wr[..=j]),
                    trend_strength: self.trend_strength(&wr[..=j], &closes[..=bar]),
                    divergence: trailing_divergence(
                        aligned_closes,
                        &wr,
                        j,
                        DIVERGENCE_LOOKBACK,
                        MIN_DIVERGENCE_POINTS,
                    ),
                }
            })
            .collect()
    }
}

impl WilliamsR {
    /// Trend strength at the last element of `history` / `closes`.
    fn trend_strength(&self, history: &[f64], closes: &[f64]) -> Strength {
        if closes.len() < 2 * self.period {
            return Strength::Weak;
        }

        let recent = &history[history.len().saturating_sub(TREND_LOOKBACK)..];
        let wr_std = std_dev(recent, mean(recent));

        let window = &closes[closes.len() - self.period..];
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        let avg = mean(window);
        let volatility = if avg == 0.0 { 0.0 } else { (max - min) / avg * 100.0 };

        if wr_std > 20.0 || volatility > 15.0 {
            Strength::Weak
        } else if wr_std < 10.0 && volatility < 5.0 {
            Strength::Strong
        } else {
            Strength::Moderate
        }
    }
}

/// %R for every bar from `period - 1`.
fn percent_r(closes: &[f64], highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
    highest(highs, period)
        .into_iter()
        .zip(lowest(lows, period))
        .enumerate()
        .map(|(i, (hh, ll))| {
            if hh == ll {
                -50.0
            } else {
                (hh - closes[period - 1 + i]) / (hh - ll) * -100.0
            }
        })
        .collect()
}

fn signal(wr: f64) -> ZoneSignal {
    if wr <= -80.0 {
        ZoneSignal::Oversold
    } else if wr >= -20.0 {
        ZoneSignal::Overbought
    } else {
        ZoneSignal::Neutral
    }
}

fn position(wr: f64) -> ZonePosition {
    if wr <= -90.0 {
        ZonePosition::ExtremeOversold
    } else if wr <= -80.0 {
        ZonePosition::Oversold
    } else if wr >= -10.0 {
        ZonePosition::ExtremeOverbought
    } else if wr >= -20.0 {
        ZonePosition::Overbought
    } else {
        ZonePosition::Neutral
    }
}

/// Newer half vs older half of `recent` (at most 6 values, at least 3).
fn momentum(recent: &[f64]) -> Bias {
    if recent.len() < 3 {
        return Bias::Neutral;
    }
    let (older, newer) = recent.split_at(recent.len() / 2);
    let (older_avg, newer_avg) = (mean(older), mean(newer));
    if newer_avg > older_avg + MOMENTUM_THRESHOLD {
        Bias::Bullish
    } else if newer_avg < older_avg - MOMENTUM_THRESHOLD {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}

/// Reversal pattern across the last three values of `history`.
fn reversal(history: &[f64]) -> ReversalSignal {
    let [oldest, middle, newest] = match history {
        [.., a, b, c] => [*a, *b, *c],
        _ => return ReversalSignal::NoReversal,
    };

    let rising = oldest <= middle && middle <= newest;
    let falling = oldest >= middle && middle >= newest;

    if rising && oldest <= -80.0 && middle <= -70.0 && newest >= -60.0 {
        return ReversalSignal::StrongReversal;
    }
    if falling && oldest >= -20.0 && middle >= -30.0 && newest <= -40.0 {
        return ReversalSignal::StrongReversal;
    }
    if (oldest <= -70.0 && newest >= -50.0) || (oldest >= -30.0 && newest <= -50.0) {
        return ReversalSignal::WeakReversal;
    }
    ReversalSignal::NoReversal
}
