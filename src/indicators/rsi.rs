// =============================================================================
// Relative Strength Index (RSI) - Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 - Compute price changes (deltas) from consecutive closes.
// Step 2 - Seed average gain / average loss with the simple mean of the first
//          `period` gains / losses.
// Step 3 - Apply Wilder's smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 - RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Zero average loss is reported as RS = 100 and RSI = 100, flat series
// included.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::Serialize;

use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{PriceSeries, Strength, ZoneSignal};

/// RS reported when the average loss is zero.
pub const RS_NO_LOSS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsiResult {
    pub rsi: f64,
    pub rs: f64,
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub signal: ZoneSignal,
    pub strength: Strength,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rsi {
    pub period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: params.period("period", 14)?,
        })
    }
}

impl Indicator for Rsi {
    type Output = RsiResult;

    fn name(&self) -> &'static str {
        "RSI"
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> Vec<RsiResult> {
        wilder_averages(&series.closes(), self.period)
            .into_iter()
            .map(|(avg_gain, avg_loss)| {
                let (rs, rsi) = rsi_from_averages(avg_gain, avg_loss);
                RsiResult {
                    rsi,
                    rs,
                    avg_gain,
                    avg_loss,
                    signal: zone(rsi),
                    strength: strength(rsi),
                }
            })
            .collect()
    }
}

/// Compute the bare RSI series for `closes`.
///
/// One value per close starting at index `period`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need at least `period` deltas)
/// - average loss of zero => 100.0
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    wilder_averages(closes, period)
        .into_iter()
        .map(|(gain, loss)| rsi_from_averages(gain, loss).1)
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Wilder-smoothed `(avg_gain, avg_loss)` for every close from index `period`.
fn wilder_averages(closes: &[f64], period: usize) -> Vec<(f64, f64)> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with the mean of the first `period` deltas -----------
    let (sum_gain, sum_loss) = deltas[..period]
        .iter()
        .fold((0.0_f64, 0.0_f64), |(g, l), &d| (g + d.max(0.0), l + (-d).max(0.0)));

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);
    result.push((avg_gain, avg_loss));

    // --- Wilder's smoothing for subsequent values ----------------------------
    for &delta in &deltas[period..] {
        avg_gain = (avg_gain * (period_f - 1.0) + delta.max(0.0)) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + (-delta).max(0.0)) / period_f;
        result.push((avg_gain, avg_loss));
    }

    result
}

/// `(rs, rsi)` from the smoothed averages.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> (f64, f64) {
    if avg_loss == 0.0 {
        return (RS_NO_LOSS, 100.0);
    }
    let rs = avg_gain / avg_loss;
    (rs, 100.0 - 100.0 / (1.0 + rs))
}

fn zone(rsi: f64) -> ZoneSignal {
    if rsi <= 30.0 {
        ZoneSignal::Oversold
    } else if rsi >= 70.0 {
        ZoneSignal::Overbought
    } else {
        ZoneSignal::Neutral
    }
}

fn strength(rsi: f64) -> Strength {
    if rsi <= 20.0 || rsi >= 80.0 {
        Strength::Strong
    } else if rsi <= 30.0 || rsi >= 70.0 {
        Strength::Moderate
    } else {
        Strength::Weak
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 16);
        for &v in &series {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for &v in &calculate_rsi(&closes, 14) {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for &v in &calculate_rsi(&closes, 14) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    // ---- Rsi calculator --------------------------------------------------

    #[test]
    fn needs_period_plus_one_bars() {
        let rsi = Rsi::default();
        assert!(rsi.calculate(&rising(14, 10.0, 1.0)).is_err());
        let out = rsi.calculate(&rising(15, 10.0, 1.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.offset, 14);
    }

    #[test]
    fn flat_series_reports_no_loss_fallback() {
        let out = Rsi::default()
            .calculate(&series_from_closes(&[50.0; 40]))
            .unwrap();
        let last = out.latest().unwrap();
        assert_eq!(last.rs, 100.0);
        assert_eq!(last.rsi, 100.0);
        assert_eq!(last.signal, ZoneSignal::Overbought);
        assert_eq!(last.strength, Strength::Strong);
    }

    #[test]
    fn falling_series_is_strong_oversold() {
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let out = Rsi::default().calculate(&series_from_closes(&closes)).unwrap();
        let last = out.latest().unwrap();
        assert!(last.rsi.abs() < 1e-10);
        assert_eq!(last.signal, ZoneSignal::Oversold);
        assert_eq!(last.strength, Strength::Strong);
    }

    #[test]
    fn wave_stays_in_range_and_is_idempotent() {
        let series = wave(300);
        let a = Rsi::default().calculate(&series).unwrap();
        let b = Rsi::default().calculate(&series).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 300 - 14);
        assert!(a.values.iter().all(|r| (0.0..=100.0).contains(&r.rsi)));
    }

    #[test]
    fn strength_bands() {
        assert_eq!(strength(25.0), Strength::Moderate);
        assert_eq!(strength(75.0), Strength::Moderate);
        assert_eq!(strength(50.0), Strength::Weak);
        assert_eq!(zone(30.0), ZoneSignal::Oversold);
        assert_eq!(zone(70.0), ZoneSignal::Overbought);
    }

    #[test]
    fn rejects_zero_period_override() {
        let params = IndicatorParams::new().with("period", 0.0);
        assert!(Rsi::from_params(&params).is_err());
    }
}
