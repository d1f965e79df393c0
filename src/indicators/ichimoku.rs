// =============================================================================
// Ichimoku Cloud
// =============================================================================
//
//   conversion (Tenkan) = (HH + LL) / 2 over `conversion` bars
//   base (Kijun)        = (HH + LL) / 2 over `base` bars
//   span A              = (conversion + base) / 2
//   span B              = (HH + LL) / 2 over `span` bars
//
// Spans are reported on the bar they are computed from (not displaced
// forward), so every line of a result describes the same bar.
// =============================================================================

use serde::Serialize;

use super::rolling::{highest, lowest};
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Bias, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IchimokuResult {
    pub conversion: f64,
    pub base: f64,
    pub span_a: f64,
    pub span_b: f64,
    /// Span A above span B => BULLISH.
    pub signal: Bias,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ichimoku {
    pub conversion: usize,
    pub base: usize,
    pub span: usize,
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self {
            conversion: 9,
            base: 26,
            span: 52,
        }
    }
}

impl Ichimoku {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            conversion: params.period("conversion", 9)?,
            base: params.period("base", 26)?,
            span: params.period("span", 52)?,
        })
    }
}

impl Indicator for Ichimoku {
    type Output = IchimokuResult;

    fn name(&self) -> &'static str {
        "ICHIMOKU"
    }

    fn warmup(&self) -> usize {
        self.conversion.max(self.base).max(self.span).saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<IchimokuResult> {
        let highs = series.highs();
        let lows = series.lows();
        let offset = self.warmup();

        let conversion = midpoints(&highs, &lows, self.conversion);
        let base = midpoints(&highs, &lows, self.base);
        let span = midpoints(&highs, &lows, self.span);

        (offset..series.len())
            .map(|bar| {
                // midpoints(.., p)[k] belongs to bar `p - 1 + k`
                let conversion = conversion[bar + 1 - self.conversion];
                let base = base[bar + 1 - self.base];
                let span_b = span[bar + 1 - self.span];
                let span_a = (conversion + base) / 2.0;
                IchimokuResult {
                    conversion,
                    base,
                    span_a,
                    span_b,
                    signal: Bias::from_sign(span_a - span_b),
                }
            })
            .collect()
    }
}

/// (highest high + lowest low) / 2 over each trailing window.
fn midpoints(highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
    highest(highs, period)
        .into_iter()
        .zip(lowest(lows, period))
        .map(|(hh, ll)| (hh + ll) / 2.0)
        .collect()
}
