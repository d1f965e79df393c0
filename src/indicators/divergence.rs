// =============================================================================
// Divergence detection
// =============================================================================
//
// Shared by the oscillators (Stochastic, Williams %R, MFI, CMF, OBV).
//
// Step 1 - Find local extrema with a strict 3-point comparison:
//            high at i  <=>  x[i] > x[i-1] && x[i] > x[i+1]
//            low  at i  <=>  x[i] < x[i-1] && x[i] < x[i+1]
// Step 2 - Compare the two most recent lows (then highs) of price and
//          oscillator:
//            price lower low  + oscillator higher low   => BULLISH_DIVERGENCE
//            price higher high + oscillator lower high  => BEARISH_DIVERGENCE
//
// The bullish check wins when both patterns are present.
// =============================================================================

use crate::types::Divergence;

/// Number of trailing points the oscillators feed into [`detect_divergence`].
pub const DIVERGENCE_LOOKBACK: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    High,
    Low,
}

/// A local extremum at `index` within the scanned slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub index: usize,
    pub value: f64,
}

/// Every strict local high or low of `values`. End points never qualify.
pub fn find_local_extrema(values: &[f64], kind: ExtremumKind) -> Vec<Extremum> {
    if values.len() < 3 {
        return Vec::new();
    }

    values
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (prev, current, next) = (w[0], w[1], w[2]);
            let is_extremum = match kind {
                ExtremumKind::High => current > prev && current > next,
                ExtremumKind::Low => current < prev && current < next,
            };
            is_extremum.then_some(Extremum {
                index: i + 1,
                value: current,
            })
        })
        .collect()
}

/// Classify price / oscillator divergence over two equally long windows.
pub fn detect_divergence(prices: &[f64], oscillator: &[f64]) -> Divergence {
    if let (Some((prev_price, last_price)), Some((prev_osc, last_osc))) = (
        last_two(prices, ExtremumKind::Low),
        last_two(oscillator, ExtremumKind::Low),
    ) {
        if last_price < prev_price && last_osc > prev_osc {
            return Divergence::BullishDivergence;
        }
    }

    if let (Some((prev_price, last_price)), Some((prev_osc, last_osc))) = (
        last_two(prices, ExtremumKind::High),
        last_two(oscillator, ExtremumKind::High),
    ) {
        if last_price > prev_price && last_osc < prev_osc {
            return Divergence::BearishDivergence;
        }
    }

    Divergence::NoDivergence
}

/// Run [`detect_divergence`] on the trailing `lookback` points of both
/// sequences ending at `end` (inclusive). Returns NO_DIVERGENCE when fewer than
/// `min_points` are available.
pub fn trailing_divergence(
    prices: &[f64],
    oscillator: &[f64],
    end: usize,
    lookback: usize,
    min_points: usize,
) -> Divergence {
    let available = (end + 1).min(lookback);
    if available < min_points || end >= prices.len() || end >= oscillator.len() {
        return Divergence::NoDivergence;
    }
    let start = end + 1 - available;
    detect_divergence(&prices[start..=end], &oscillator[start..=end])
}

/// Values of the previous and most recent extremum of the given kind.
fn last_two(values: &[f64], kind: ExtremumKind) -> Option<(f64, f64)> {
    let extrema = find_local_extrema(values, kind);
    match extrema.as_slice() {
        [.., prev, last] => Some((prev.value, last.value)),
        _ => None,
    }
}
