// =============================================================================
// Rolling-window primitives
// =============================================================================
//
// Building blocks shared by every calculator. Each function returns a vector
// aligned to the END of its first full window:
//
//   sma / ema / wilder / highest / lowest   -> element 0 belongs to input index `period - 1`
//   true_ranges                             -> element 0 belongs to bar index 1
//
// All functions return an empty vector when `period == 0` or the input is
// shorter than one window. Callers validate lengths before relying on output.
//
// EMA recurrence:
//   multiplier = 2 / (period + 1)
//   EMA_t      = x_t * multiplier + EMA_{t-1} * (1 - multiplier)
// seeded with the SMA of the first `period` values.
//
// Wilder recurrence:
//   W_t = (W_{t-1} * (period - 1) + x_t) / period
// seeded the same way.
// =============================================================================

use crate::types::PriceBar;

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed `mean`.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Simple moving average over each trailing window.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values.windows(period).map(mean).collect()
}

/// Exponential moving average, SMA-seeded.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;
    let seed = mean(&values[..period]);

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = value * multiplier + prev * (1.0 - multiplier);
        result.push(prev);
    }
    result
}

/// Wilder's smoothed average, SMA-seeded.
pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let period_f = period as f64;
    let seed = mean(&values[..period]);

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = (prev * (period_f - 1.0) + value) / period_f;
        result.push(prev);
    }
    result
}

/// Rolling maximum.
pub fn highest(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect()
}

/// Rolling minimum.
pub fn lowest(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}

/// True range of every bar that has a predecessor:
/// `max(H - L, |H - prevClose|, |L - prevClose|)`.
pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|pair| {
            let (prev, bar) = (&pair[0], &pair[1]);
            (bar.high - bar.low)
                .max((bar.high - prev.close).abs())
                .max((bar.low - prev.close).abs())
        })
        .collect()
}

/// Percentage change of `to` relative to `from`; 0.0 when `from` is zero.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        0.0
    } else {
        (to - from) / from * 100.0
    }
}
