// =============================================================================
// Chaikin Money Flow (CMF)
// =============================================================================
//
//   MFM  = ((C - L) - (H - C)) / (H - L)        0 for a zero-range bar
//   CMF  = sum(MFM * volume) / sum(volume)      over `period` bars
//
// Zero window volume gives CMF 0.
//
// Bands:  CMF > 0.1 => ACCUMULATION,  CMF < -0.1 => DISTRIBUTION
//         |CMF| > 0.05 sets buying / selling pressure
// =============================================================================

use serde::Serialize;

use super::divergence::{trailing_divergence, DIVERGENCE_LOOKBACK};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Divergence, PriceBar, PriceSeries, Strength};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    Accumulation,
    Distribution,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pressure {
    BuyingPressure,
    SellingPressure,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CmfResult {
    pub cmf: f64,
    pub flow_type: FlowType,
    pub strength: Strength,
    pub pressure: Pressure,
    pub divergence: Divergence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cmf {
    pub period: usize,
}

impl Default for Cmf {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Cmf {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 20)?,
        })
    }
}

impl Indicator for Cmf {
    type Output = CmfResult;

    fn name(&self) -> &'static str {
        "CMF"
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<CmfResult> {
        if self.period == 0 {
            return Vec::new();
        }

        let cmf_values: Vec<f64> = series
            .bars()
            .windows(self.period)
            .map(|window| {
                let (flow_volume, volume) = window.iter().fold((0.0, 0.0), |(fv, v), bar| {
                    (fv + multiplier(bar) * bar.volume, v + bar.volume)
                });
                if volume == 0.0 {
                    0.0
                } else {
                    flow_volume / volume
                }
            })
            .collect();

        let closes = series.closes();
        let aligned_closes = &closes[self.warmup()..];

        cmf_values
            .iter()
            .enumerate()
            .map(|(j, &cmf)| CmfResult {
                cmf,
                flow_type: if cmf > 0.1 {
                    FlowType::Accumulation
                } else if cmf < -0.1 {
                    FlowType::Distribution
                } else {
                    FlowType::Neutral
                },
                strength: if cmf.abs() > 0.2 {
                    Strength::Strong
                } else if cmf.abs() > 0.1 {
                    Strength::Moderate
                } else {
                    Strength::Weak
                },
                pressure: if cmf > 0.05 {
                    Pressure::BuyingPressure
                } else if cmf < -0.05 {
                    Pressure::SellingPressure
                } else {
                    Pressure::Balanced
                },
                divergence: trailing_divergence(
                    aligned_closes,
                    &cmf_values,
                    j,
                    DIVERGENCE_LOOKBACK,
                    DIVERGENCE_LOOKBACK,
                ),
            })
            .collect()
    }
}

/// Money-flow multiplier in [-1, 1].
fn multiplier(bar: &PriceBar) -> f64 {
    let range = bar.high - bar.low;
    if range == 0.0 {
        return 0.0;
    }
    ((bar.close - bar.low) - (bar.high - bar.close)) / range
}
