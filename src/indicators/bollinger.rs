// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), with σ the population standard deviation of
// the window. The Band Width (BBW) is the normalised distance:
//   BBW = (upper - lower) / middle * 100
// and %B locates the close inside the bands:
//   %B  = (close - lower) / (upper - lower)
//
// Squeeze status compares the current BBW with the mean BBW of the `period`
// results before it:
//   ratio < 0.7 && BBW < 6   => IN_SQUEEZE
//   ratio < 0.8 && BBW < 8   => ENTERING_SQUEEZE
//   ratio > 1.3 && BBW > 10  => EXITING_SQUEEZE
// =============================================================================

use serde::Serialize;

use super::rolling::{mean, std_dev};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BollingerSignal {
    Squeeze,
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandPosition {
    AboveUpper,
    BelowLower,
    AtMiddle,
    BetweenBands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqueezeStatus {
    InSqueeze,
    EnteringSqueeze,
    ExitingSqueeze,
    Normal,
}

/// Result of a Bollinger Band calculation for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerResult {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub width: f64,
    pub percent_b: f64,
    pub signal: BollingerSignal,
    pub position: BandPosition,
    pub volatility: VolatilityLevel,
    pub squeeze_status: SqueezeStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 20)?,
            std_dev: params.factor("std_dev", 2.0)?,
        })
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerResult;

    fn name(&self) -> &'static str {
        "BOLLINGER"
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<BollingerResult> {
        if self.period == 0 {
            return Vec::new();
        }
        let closes = series.closes();

        let mut results: Vec<BollingerResult> = Vec::with_capacity(closes.len());
        for (i, window) in closes.windows(self.period).enumerate() {
            let close = window[window.len() - 1];
            let middle = mean(window);
            let sigma = std_dev(window, middle);
            let upper = middle + self.std_dev * sigma;
            let lower = middle - self.std_dev * sigma;

            let width = if middle == 0.0 {
                0.0
            } else {
                (upper - lower) / middle * 100.0
            };
            let percent_b = if upper == lower {
                0.5
            } else {
                (close - lower) / (upper - lower)
            };

            let squeeze_status = if i >= self.period {
                let prior: Vec<f64> = results[i - self.period..i].iter().map(|r| r.width).collect();
                squeeze_status(width, mean(&prior))
            } else {
                SqueezeStatus::Normal
            };

            results.push(BollingerResult {
                middle,
                upper,
                lower,
                width,
                percent_b,
                signal: signal(close, upper, lower, width, percent_b),
                position: band_position(close, upper, lower, middle),
                volatility: volatility(width),
                squeeze_status,
            });
        }
        results
    }
}

// =============================================================================
// Classification
// =============================================================================

fn signal(close: f64, upper: f64, lower: f64, width: f64, percent_b: f64) -> BollingerSignal {
    if width < 5.0 {
        BollingerSignal::Squeeze
    } else if close > upper || percent_b > 1.0 {
        BollingerSignal::Overbought
    } else if close < lower || percent_b < 0.0 {
        BollingerSignal::Oversold
    } else {
        BollingerSignal::Neutral
    }
}

fn band_position(close: f64, upper: f64, lower: f64, middle: f64) -> BandPosition {
    if close > upper {
        BandPosition::AboveUpper
    } else if close < lower {
        BandPosition::BelowLower
    } else if (close - middle).abs() < (upper - lower) * 0.1 {
        BandPosition::AtMiddle
    } else {
        BandPosition::BetweenBands
    }
}

fn volatility(width: f64) -> VolatilityLevel {
    if width > 15.0 {
        VolatilityLevel::High
    } else if width > 8.0 {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::Low
    }
}

fn squeeze_status(width: f64, average_width: f64) -> SqueezeStatus {
    if average_width == 0.0 {
        return SqueezeStatus::Normal;
    }
    let ratio = width / average_width;
    if ratio < 0.7 && width < 6.0 {
        SqueezeStatus::InSqueeze
    } else if ratio < 0.8 && width < 8.0 {
        SqueezeStatus::EnteringSqueeze
    } else if ratio > 1.3 && width > 10.0 {
        SqueezeStatus::ExitingSqueeze
    } else {
        SqueezeStatus::Normal
    }
}
