// =============================================================================
// Moving Averages (SMA + EMA) with position and trend classification
// =============================================================================
//
// SMA = arithmetic mean of the trailing `period` closes.
// EMA = SMA-seeded exponential average (see `rolling::ema`).
//
// Position compares the close with the EMA inside a 0.1% tolerance band.
// Trend comes from the slope across the last 5 EMA values:
//   slope     = (EMA_t - EMA_{t-4}) / 4
//   slope_pct = slope / EMA_{t-4} * 100
//   > +0.1 => UPTREND,  < -0.1 => DOWNTREND,  otherwise SIDEWAYS
// =============================================================================

use serde::Serialize;

use super::rolling::{ema, sma};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::PriceSeries;

/// Number of EMA values spanned by the slope estimate.
const SLOPE_SPAN: usize = 5;
const SLOPE_THRESHOLD_PCT: f64 = 0.1;
const POSITION_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaPosition {
    Above,
    Below,
    AtMa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaTrend {
    Uptrend,
    Downtrend,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovingAverageResult {
    pub period: usize,
    pub sma: f64,
    pub ema: f64,
    pub position: MaPosition,
    pub trend: MaTrend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    pub period: usize,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl MovingAverage {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn from_params(params: &IndicatorParams, default_period: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", default_period)?,
        })
    }
}

impl Indicator for MovingAverage {
    type Output = MovingAverageResult;

    fn name(&self) -> &'static str {
        "MA"
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<MovingAverageResult> {
        let closes = series.closes();
        let smas = sma(&closes, self.period);
        let emas = ema(&closes, self.period);

        smas.iter()
            .zip(&emas)
            .enumerate()
            .map(|(i, (&sma, &ema))| {
                let close = closes[self.warmup() + i];
                MovingAverageResult {
                    period: self.period,
                    sma,
                    ema,
                    position: position(close, ema),
                    trend: trend(&emas[..=i]),
                }
            })
            .collect()
    }
}

fn position(close: f64, ema: f64) -> MaPosition {
    if (close - ema).abs() <= close.abs() * POSITION_TOLERANCE {
        MaPosition::AtMa
    } else if close > ema {
        MaPosition::Above
    } else {
        MaPosition::Below
    }
}

/// Trend of the EMA history ending at its last element.
fn trend(emas: &[f64]) -> MaTrend {
    if emas.len() < SLOPE_SPAN {
        return MaTrend::Sideways;
    }
    let last = emas[emas.len() - 1];
    let base = emas[emas.len() - SLOPE_SPAN];
    if base == 0.0 {
        return MaTrend::Sideways;
    }

    let slope = (last - base) / (SLOPE_SPAN - 1) as f64;
    let slope_pct = slope / base * 100.0;
    if slope_pct > SLOPE_THRESHOLD_PCT {
        MaTrend::Uptrend
    } else if slope_pct < -SLOPE_THRESHOLD_PCT {
        MaTrend::Downtrend
    } else {
        MaTrend::Sideways
    }
}
