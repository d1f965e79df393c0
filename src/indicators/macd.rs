// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(signal) of the MACD line
//   Histogram   = MACD line - signal line
//
// The MACD line exists from bar `slow - 1`; the signal EMA is seeded with the
// mean of the first `signal` MACD values, so the first full result belongs to
// bar `slow - 1 + signal - 1` (33 for 12/26/9).
// =============================================================================

use serde::Serialize;

use super::rolling::ema;
use super::{Indicator, IndicatorParams};
use crate::error::IndicatorError;
use crate::types::{Bias, Crossover, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Sign of the MACD line; NEUTRAL at exactly zero.
    pub trend: Bias,
    /// MACD line versus signal line since the previous bar. The first result
    /// has no predecessor and is always NONE.
    pub crossover: Crossover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Macd {
    /// # Edge cases
    /// - `fast >= slow` => `InvalidParams`
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        if fast == 0 || signal == 0 {
            return Err(IndicatorError::invalid_params("MACD periods must be positive"));
        }
        if fast >= slow {
            return Err(IndicatorError::invalid_params(format!(
                "MACD fast period ({fast}) must be below slow period ({slow})"
            )));
        }
        Ok(Self { fast, slow, signal })
    }

    pub fn from_params(params: &IndicatorParams) -> Result<Self, IndicatorError> {
        Self::new(
            params.period("fast", 12)?,
            params.period("slow", 26)?,
            params.period("signal", 9)?,
        )
    }
}

impl Indicator for Macd {
    type Output = MacdResult;

    fn name(&self) -> &'static str {
        "MACD"
    }

    fn warmup(&self) -> usize {
        self.slow.saturating_add(self.signal).saturating_sub(2)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<MacdResult> {
        let closes = series.closes();
        let ema_fast = ema(&closes, self.fast);
        let ema_slow = ema(&closes, self.slow);
        if ema_slow.is_empty() || self.fast > self.slow {
            return Vec::new();
        }

        // Align EMA(fast) to EMA(slow): both index from their own warm-up.
        let shift = self.slow - self.fast;
        let macd_line: Vec<f64> = ema_slow
            .iter()
            .enumerate()
            .map(|(j, slow)| ema_fast[shift + j] - slow)
            .collect();

        let signal_line = ema(&macd_line, self.signal);
        let lead = self.signal - 1;

        let mut results: Vec<MacdResult> = Vec::with_capacity(signal_line.len());
        for (i, &signal) in signal_line.iter().enumerate() {
            let macd = macd_line[lead + i];
            let crossover = match results.last() {
                Some(prev) => Crossover::detect(prev.macd, prev.signal, macd, signal),
                None => Crossover::None,
            };
            results.push(MacdResult {
                macd,
                signal,
                histogram: macd - signal,
                trend: Bias::from_sign(macd),
                crossover,
            });
        }
        results
    }
}
