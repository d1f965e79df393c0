// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// The first DX belongs to bar `period`, the first ADX to bar `2 * period - 1`.
//
// Interpretation:
//   ADX > 25  => trending market, direction from the DI ordering
// =============================================================================

use serde::Serialize;

use super::rolling::wilder;
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::PriceSeries;

/// ADX level above which a trend is considered established.
const TREND_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdxTrend {
    StrongBullish,
    StrongBearish,
    NoTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdxResult {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub trend: AdxTrend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Adx {
    pub period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 14)?,
        })
    }
}

impl Indicator for Adx {
    type Output = AdxResult;

    fn name(&self) -> &'static str {
        "ADX"
    }

    fn warmup(&self) -> usize {
        self.period.saturating_mul(2).saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<AdxResult> {
        let period = self.period;
        let period_f = period as f64;
        let bars = series.bars();
        if period == 0 || bars.len() < 2 * period {
            return Vec::new();
        }

        // ------------------------------------------------------------------
        // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
        // ------------------------------------------------------------------
        let transitions = bars.len() - 1;
        let mut plus_dm = Vec::with_capacity(transitions);
        let mut minus_dm = Vec::with_capacity(transitions);
        let mut tr_vals = Vec::with_capacity(transitions);

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);

            let tr = (bar.high - bar.low)
                .max((bar.high - prev.close).abs())
                .max((bar.low - prev.close).abs());

            let up_move = bar.high - prev.high;
            let down_move = prev.low - bar.low;

            plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
            minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
            tr_vals.push(tr);
        }

        // ------------------------------------------------------------------
        // Step 3-5: Wilder running sums, DI and DX per bar from `period`
        // ------------------------------------------------------------------
        let mut smooth_plus_dm: f64 = plus_dm[..period].iter().sum();
        let mut smooth_minus_dm: f64 = minus_dm[..period].iter().sum();
        let mut smooth_tr: f64 = tr_vals[..period].iter().sum();

        let mut di = Vec::with_capacity(transitions - period + 1);
        di.push(directional_indices(smooth_plus_dm, smooth_minus_dm, smooth_tr));

        for i in period..transitions {
            smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
            smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
            smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];
            di.push(directional_indices(smooth_plus_dm, smooth_minus_dm, smooth_tr));
        }

        // ------------------------------------------------------------------
        // Step 6: ADX = Wilder's smoothed average of DX
        // ------------------------------------------------------------------
        let dx: Vec<f64> = di.iter().map(|&(plus, minus)| compute_dx(plus, minus)).collect();

        wilder(&dx, period)
            .into_iter()
            .enumerate()
            .map(|(i, adx)| {
                let (plus_di, minus_di) = di[period - 1 + i];
                let trend = if adx > TREND_THRESHOLD && plus_di > minus_di {
                    AdxTrend::StrongBullish
                } else if adx > TREND_THRESHOLD && minus_di > plus_di {
                    AdxTrend::StrongBearish
                } else {
                    AdxTrend::NoTrend
                };
                AdxResult {
                    adx,
                    plus_di,
                    minus_di,
                    trend,
                }
            })
            .collect()
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// +DI / -DI from the smoothed sums. A zero smoothed TR means no movement.
fn directional_indices(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> (f64, f64) {
    if smooth_tr == 0.0 {
        return (0.0, 0.0);
    }
    (
        smooth_plus_dm / smooth_tr * 100.0,
        smooth_minus_dm / smooth_tr * 100.0,
    )
}

/// DX from +DI / -DI; 0 when both are zero.
fn compute_dx(plus_di: f64, minus_di: f64) -> f64 {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    (plus_di - minus_di).abs() / di_sum * 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceBar;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar::new(open, high, low, close, 1.0)
    }

    fn series(bars: Vec<PriceBar>) -> PriceSeries {
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn adx_minimum_bars_exact() {
        let period = 5;
        let bars: Vec<PriceBar> = (0..2 * period)
            .map(|i| {
                let base = 100.0 + i as f64;
                candle(base, base + 1.0, base - 0.5, base + 0.5)
            })
            .collect();
        let adx = Adx { period };
        assert_eq!(adx.calculate(&series(bars.clone())).unwrap().len(), 1);
        assert!(adx.calculate(&series(bars[..2 * period - 1].to_vec())).is_err());
    }

    #[test]
    fn adx_strong_uptrend() {
        let bars: Vec<PriceBar> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                candle(base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        let out = Adx::default().calculate(&series(bars)).unwrap();
        let last = out.latest().unwrap();
        assert!(last.adx > 25.0, "expected ADX > 25 for strong trend, got {}", last.adx);
        assert_eq!(last.trend, AdxTrend::StrongBullish);
        assert_eq!(out.len(), 60 - 27);
    }

    #[test]
    fn adx_flat_market() {
        let bars = vec![candle(100.0, 101.0, 99.0, 100.0); 60];
        let out = Adx::default().calculate(&series(bars)).unwrap();
        let last = out.latest().unwrap();
        assert!(last.adx < 1.0, "expected ADX near 0 for flat market, got {}", last.adx);
        assert_eq!(last.trend, AdxTrend::NoTrend);
    }

    #[test]
    fn adx_result_range() {
        let bars: Vec<PriceBar> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                candle(base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        let out = Adx::default().calculate(&series(bars)).unwrap();
        for r in &out.values {
            assert!((0.0..=100.0).contains(&r.adx), "ADX {} out of range", r.adx);
        }
    }
}
