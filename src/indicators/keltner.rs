// =============================================================================
// Keltner Channel
// =============================================================================
//
//   middle = SMA(close, period)
//   upper  = middle + multiplier * ATR(atr_period)
//   lower  = middle - multiplier * ATR(atr_period)
//
// The signal compares each bar's own close with its bands.
// =============================================================================

use serde::Serialize;

use super::atr::calculate_atr;
use super::rolling::sma;
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{PriceSeries, ZoneSignal};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeltnerResult {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub signal: ZoneSignal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeltnerChannel {
    pub period: usize,
    pub multiplier: f64,
    pub atr_period: usize,
}

impl Default for KeltnerChannel {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
            atr_period: 10,
        }
    }
}

impl KeltnerChannel {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 20)?,
            multiplier: params.factor("multiplier", 2.0)?,
            atr_period: params.period("atr_period", 10)?,
        })
    }
}

impl Indicator for KeltnerChannel {
    type Output = KeltnerResult;

    fn name(&self) -> &'static str {
        "KELTNER"
    }

    fn warmup(&self) -> usize {
        self.period.saturating_sub(1).max(self.atr_period)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<KeltnerResult> {
        let closes = series.closes();
        let middles = sma(&closes, self.period);
        let atrs = calculate_atr(series.bars(), self.atr_period);
        if middles.is_empty() || atrs.is_empty() {
            return Vec::new();
        }

        // middles[k] belongs to bar `period - 1 + k`, atrs[k] to bar `atr_period + k`.
        (self.warmup()..closes.len())
            .map(|bar| {
                let middle = middles[bar + 1 - self.period];
                let band = self.multiplier * atrs[bar - self.atr_period];
                let (upper, lower) = (middle + band, middle - band);
                let close = closes[bar];
                let signal = if close > upper {
                    ZoneSignal::Overbought
                } else if close < lower {
                    ZoneSignal::Oversold
                } else {
                    ZoneSignal::Neutral
                };
                KeltnerResult {
                    middle,
                    upper,
                    lower,
                    signal,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    #[test]
    fn warmup_takes_the_longer_window() {
        assert_eq!(KeltnerChannel::default().warmup(), 19);
        let wide_atr = KeltnerChannel {
            atr_period: 30,
            ..KeltnerChannel::default()
        };
        assert_eq!(wide_atr.warmup(), 30);
        assert_eq!(wide_atr.calculate(&rising(40, 10.0, 1.0)).unwrap().len(), 10);
    }

    #[test]
    fn flat_series_sits_inside_bands() {
        let out = KeltnerChannel::default()
            .calculate(&series_from_closes(&[50.0; 30]))
            .unwrap();
        let last = out.latest().unwrap();
        // TR is the constant 2.0 bar range
        assert!((last.upper - 54.0).abs() < 1e-12);
        assert!((last.lower - 46.0).abs() < 1e-12);
        assert_eq!(last.signal, ZoneSignal::Neutral);
    }

    #[test]
    fn spike_breaks_upper_band() {
        let mut closes = vec![50.0; 30];
        closes.push(70.0);
        let out = KeltnerChannel::default()
            .calculate(&series_from_closes(&closes))
            .unwrap();
        assert_eq!(out.latest().unwrap().signal, ZoneSignal::Overbought);
    }
}
