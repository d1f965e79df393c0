// =============================================================================
// Volume-Weighted Average Price (VWAP)
// =============================================================================
//
// Anchored at the first bar of the series:
//   VWAP_t = sum(TP_i * V_i) / sum(V_i)   for i in 0..=t,  TP = (H + L + C) / 3
//
// Equals the close while cumulative volume is zero. Every bar has a result.
//
//   distance = (close - VWAP) / VWAP * 100     > 1 BULLISH, < -1 BEARISH
//   volume profile: bar volume vs running mean volume (x1.5 high, x0.5 low)
// =============================================================================

use serde::Serialize;

use super::Indicator;
use crate::types::{Bias, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VwapPosition {
    Above,
    Below,
    AtVwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeProfile {
    HighVolumeArea,
    LowVolumeArea,
    AverageVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VwapResult {
    pub vwap: f64,
    pub position: VwapPosition,
    pub bias: Bias,
    pub distance_percent: f64,
    pub volume_profile: VolumeProfile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vwap;

impl Indicator for Vwap {
    type Output = VwapResult;

    fn name(&self) -> &'static str {
        "VWAP"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, series: &PriceSeries) -> Vec<VwapResult> {
        let mut cumulative_pv = 0.0;
        let mut cumulative_volume = 0.0;

        series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                cumulative_pv += bar.typical_price() * bar.volume;
                cumulative_volume += bar.volume;

                let vwap = if cumulative_volume == 0.0 {
                    bar.close
                } else {
                    cumulative_pv / cumulative_volume
                };
                let distance_percent = if vwap == 0.0 {
                    0.0
                } else {
                    (bar.close - vwap) / vwap * 100.0
                };

                let position = if bar.close > vwap {
                    VwapPosition::Above
                } else if bar.close < vwap {
                    VwapPosition::Below
                } else {
                    VwapPosition::AtVwap
                };
                let bias = if distance_percent > 1.0 {
                    Bias::Bullish
                } else if distance_percent < -1.0 {
                    Bias::Bearish
                } else {
                    Bias::Neutral
                };

                let average_volume = cumulative_volume / (i + 1) as f64;
                let volume_profile = if bar.volume > average_volume * 1.5 {
                    VolumeProfile::HighVolumeArea
                } else if bar.volume < average_volume * 0.5 {
                    VolumeProfile::LowVolumeArea
                } else {
                    VolumeProfile::AverageVolume
                };

                VwapResult {
                    vwap,
                    position,
                    bias,
                    distance_percent,
                    volume_profile,
                }
            })
            .collect()
    }
}
