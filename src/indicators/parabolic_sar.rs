// =============================================================================
// Parabolic SAR (Wilder's stop-and-reverse)
// =============================================================================
//
//   SAR_{t+1} = SAR_t + AF * (EP - SAR_t)
//
// EP is the extreme point of the current trend (highest high in an uptrend,
// lowest low in a downtrend). AF starts at `step`, grows by `step` on every
// new EP and is capped at `max`. In an uptrend the SAR may not rise above the
// two previous lows (mirror for a downtrend). When price penetrates the SAR
// the trend flips, SAR jumps to the old EP and AF resets.
//
// The initial trend is taken from the first two closes; results start at
// bar 1.
// =============================================================================

use serde::Serialize;

use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Bias, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParabolicSarResult {
    pub psar: f64,
    pub trend: Bias,
    /// Trend flipped on this bar.
    pub reversal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParabolicSar {
    pub step: f64,
    pub max: f64,
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self {
            step: 0.02,
            max: 0.2,
        }
    }
}

impl ParabolicSar {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        let step = params.factor("step", 0.02)?;
        let max = params.factor("max", 0.2)?;
        if step > max {
            return Err(IndicatorError::invalid_params(format!(
                "PSAR step ({step}) must not exceed max ({max})"
            )));
        }
        Ok(Self { step, max })
    }
}

impl Indicator for ParabolicSar {
    type Output = ParabolicSarResult;

    fn name(&self) -> &'static str {
        "PSAR"
    }

    fn warmup(&self) -> usize {
        1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<ParabolicSarResult> {
        let bars = series.bars();
        if bars.len() < 2 {
            return Vec::new();
        }

        let (first, second) = (&bars[0], &bars[1]);
        let mut uptrend = second.close >= first.close;
        let mut af = self.step;
        let (mut sar, mut ep) = if uptrend {
            (first.low.min(second.low), first.high.max(second.high))
        } else {
            (first.high.max(second.high), first.low.min(second.low))
        };

        let mut results = Vec::with_capacity(bars.len() - 1);
        results.push(ParabolicSarResult {
            psar: sar,
            trend: trend(uptrend),
            reversal: false,
        });

        for i in 2..bars.len() {
            let bar = &bars[i];
            let mut next = sar + af * (ep - sar);
            let mut reversal = false;

            if uptrend {
                next = next.min(bars[i - 1].low).min(bars[i - 2].low);
                if bar.low < next {
                    uptrend = false;
                    reversal = true;
                    next = ep;
                    ep = bar.low;
                    af = self.step;
                } else if bar.high > ep {
                    ep = bar.high;
                    af = (af + self.step).min(self.max);
                }
            } else {
                next = next.max(bars[i - 1].high).max(bars[i - 2].high);
                if bar.high > next {
                    uptrend = true;
                    reversal = true;
                    next = ep;
                    ep = bar.high;
                    af = self.step;
                } else if bar.low < ep {
                    ep = bar.low;
                    af = (af + self.step).min(self.max);
                }
            }

            sar = next;
            results.push(ParabolicSarResult {
                psar: sar,
                trend: trend(uptrend),
                reversal,
            });
        }
        results
    }
}

fn trend(uptrend: bool) -> Bias {
    if uptrend {
        Bias::Bullish
    } else {
        Bias::Bearish
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    #[test]
    fn rising_series_keeps_sar_below_lows() {
        let series = rising(50, 100.0, 1.0);
        let out = ParabolicSar::default().calculate(&series).unwrap();
        assert_eq!(out.len(), 49);
        for (i, r) in out.values.iter().enumerate() {
            assert_eq!(r.trend, Bias::Bullish);
            assert!(!r.reversal);
            assert!(r.psar <= series.bars()[out.bar_index(i)].low);
        }
    }

    #[test]
    fn sharp_drop_reverses_trend() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.extend((1..10).map(|i| 119.0 - 5.0 * i as f64));
        let out = ParabolicSar::default()
            .calculate(&series_from_closes(&closes))
            .unwrap();
        assert!(out.values.iter().any(|r| r.reversal));
        assert_eq!(out.latest().unwrap().trend, Bias::Bearish);
    }

    #[test]
    fn step_above_max_is_rejected() {
        let params = IndicatorParams::new().with("step", 0.5);
        assert!(ParabolicSar::from_params(&params).is_err());
    }
}
