// =============================================================================
// Money Flow Index (MFI)
// =============================================================================
//
// Volume-weighted RSI on the typical price TP = (H + L + C) / 3.
//
//   raw flow  = TP * volume
//   positive  = raw flow of bars whose TP rose versus the previous bar
//   negative  = raw flow of bars whose TP fell
//   MFI       = 100 - 100 / (1 + positive / negative)     over `period` bars
//
// Zero negative flow gives 100, or 50 when both flows are zero.
// Results start at bar `period` (each flow needs a previous bar).
// =============================================================================

use serde::Serialize;

use super::divergence::{trailing_divergence, DIVERGENCE_LOOKBACK};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Divergence, PriceSeries, Strength, ZoneSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoneyFlow {
    Positive,
    Negative,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MfiResult {
    pub mfi: f64,
    pub signal: ZoneSignal,
    pub strength: Strength,
    pub money_flow: MoneyFlow,
    pub divergence: Divergence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mfi {
    pub period: usize,
}

impl Default for Mfi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Mfi {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 14)?,
        })
    }
}

impl Indicator for Mfi {
    type Output = MfiResult;

    fn name(&self) -> &'static str {
        "MFI"
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<MfiResult> {
        if self.period == 0 {
            return Vec::new();
        }
        let typical = series.typical_prices();
        let volumes = series.volumes();

        // Signed flow per transition: (positive, negative), for bars 1..n.
        let flows: Vec<(f64, f64)> = typical
            .windows(2)
            .zip(volumes.iter().skip(1))
            .map(|(tp, &volume)| {
                let raw = tp[1] * volume;
                if tp[1] > tp[0] {
                    (raw, 0.0)
                } else if tp[1] < tp[0] {
                    (0.0, raw)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect();

        let sums: Vec<(f64, f64)> = flows
            .windows(self.period)
            .map(|window| {
                window
                    .iter()
                    .fold((0.0, 0.0), |(p, n), &(fp, fneg)| (p + fp, n + fneg))
            })
            .collect();
        let mfi_values: Vec<f64> = sums
            .iter()
            .map(|&(pos, neg)| money_flow_index(pos, neg))
            .collect();

        // mfi_values[j] belongs to bar `period + j`.
        let closes = series.closes();
        let aligned_closes = &closes[self.period..];

        sums.iter()
            .zip(&mfi_values)
            .enumerate()
            .map(|(j, (&(pos, neg), &mfi))| MfiResult {
                mfi,
                signal: signal(mfi),
                strength: strength(mfi),
                money_flow: if pos > neg {
                    MoneyFlow::Positive
                } else if pos < neg {
                    MoneyFlow::Negative
                } else {
                    MoneyFlow::Balanced
                },
                divergence: trailing_divergence(
                    aligned_closes,
                    &mfi_values,
                    j,
                    DIVERGENCE_LOOKBACK,
                    DIVERGENCE_LOOKBACK,
                ),
            })
            .collect()
    }
}

fn money_flow_index(positive: f64, negative: f64) -> f64 {
    if negative == 0.0 {
        return if positive == 0.0 { 50.0 } else { 100.0 };
    }
    100.0 - 100.0 / (1.0 + positive / negative)
}

fn signal(mfi: f64) -> ZoneSignal {
    if mfi > 80.0 {
        ZoneSignal::Overbought
    } else if mfi < 20.0 {
        ZoneSignal::Oversold
    } else {
        ZoneSignal::Neutral
    }
}

fn strength(mfi: f64) -> Strength {
    if mfi > 90.0 || mfi < 10.0 {
        Strength::Strong
    } else if mfi > 80.0 || mfi < 20.0 {
        Strength::Moderate
    } else {
        Strength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    #[test]
    fn needs_period_plus_one_bars() {
        let mfi = Mfi::default();
        assert!(mfi.calculate(&rising(14, 10.0, 1.0)).is_err());
        assert_eq!(mfi.calculate(&rising(15, 10.0, 1.0)).unwrap().len(), 1);
    }

    #[test]
    fn only_inflows_pin_to_hundred() {
        let out = Mfi::default().calculate(&rising(30, 10.0, 1.0)).unwrap();
        let last = out.latest().unwrap();
        assert_eq!(last.mfi, 100.0);
        assert_eq!(last.signal, ZoneSignal::Overbought);
        assert_eq!(last.strength, Strength::Strong);
        assert_eq!(last.money_flow, MoneyFlow::Positive);
    }

    #[test]
    fn no_flow_is_fifty() {
        let out = Mfi::default()
            .calculate(&series_from_closes(&[20.0; 20]))
            .unwrap();
        let last = out.latest().unwrap();
        assert_eq!(last.mfi, 50.0);
        assert_eq!(last.money_flow, MoneyFlow::Balanced);
    }

    #[test]
    fn falling_series_is_oversold() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = Mfi::default().calculate(&series_from_closes(&closes)).unwrap();
        let last = out.latest().unwrap();
        assert!(last.mfi.abs() < 1e-10);
        assert_eq!(last.signal, ZoneSignal::Oversold);
        assert_eq!(last.money_flow, MoneyFlow::Negative);
    }

    #[test]
    fn values_stay_in_range() {
        let out = Mfi::default().calculate(&wave(200)).unwrap();
        assert!(out.values.iter().all(|r| (0.0..=100.0).contains(&r.mfi)));
    }
}
