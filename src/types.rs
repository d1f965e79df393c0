// =============================================================================
// Shared types used across the Nexus indicator engine
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

// =============================================================================
// Price data
// =============================================================================

/// A single OHLCV bar. Immutable once it has been accepted into a
/// [`PriceSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Exchange open time in epoch milliseconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<i64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded volume; zero when the source does not report one.
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time: None,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn with_open_time(mut self, open_time: i64) -> Self {
        self.open_time = Some(open_time);
        self
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Check the OHLCV invariants. Returns a human-readable reason on failure.
    fn validate(&self) -> Result<(), String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err("non-finite price".into());
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(format!("invalid volume {}", self.volume));
        }
        if self.low > self.high {
            return Err(format!("low {} above high {}", self.low, self.high));
        }
        for (label, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Err(format!(
                    "{label} {value} outside [{}, {}]",
                    self.low, self.high
                ));
            }
        }
        Ok(())
    }
}

/// Chronological (oldest first) sequence of validated bars.
///
/// Ordering and gap-freeness are the caller's responsibility; only the per-bar
/// OHLCV invariants are enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validate and wrap `bars`.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, IndicatorError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|reason| {
                IndicatorError::InvalidPriceData(format!("bar {index}: {reason}"))
            })?;
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn typical_prices(&self) -> Vec<f64> {
        self.bars.iter().map(PriceBar::typical_price).collect()
    }

    pub fn median_prices(&self) -> Vec<f64> {
        self.bars.iter().map(PriceBar::median_price).collect()
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = IndicatorError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

// =============================================================================
// Query / output modes
// =============================================================================

/// Which part of an indicator's aligned result sequence the caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Only the most recent value.
    #[default]
    Latest,
    /// The entire aligned sequence.
    Full,
}

/// Output shape of a composite analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Latest value of every indicator plus the verdict.
    #[default]
    Summary,
    /// Summary plus every calculator's full aligned result sequence.
    FullData,
}

// =============================================================================
// Shared signal labels
// =============================================================================

/// Oversold / overbought banding shared by the bounded oscillators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneSignal {
    Oversold,
    Overbought,
    Neutral,
}

/// Five-band position used by Stochastic and Williams %R.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZonePosition {
    ExtremeOversold,
    Oversold,
    Neutral,
    Overbought,
    ExtremeOverbought,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

/// Direction of a two-state or signed reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl Bias {
    /// Classify a signed value; exactly zero is neutral.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Self::Bullish
        } else if value < 0.0 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

/// Line-over-line crossing between the previous and current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Crossover {
    BullishCrossover,
    BearishCrossover,
    None,
}

impl Crossover {
    /// Detect a crossing of `line` over `reference`.
    ///
    /// Bullish when the line moves from `<=` the reference to `>` it, bearish
    /// for the mirrored transition.
    pub fn detect(prev_line: f64, prev_reference: f64, line: f64, reference: f64) -> Self {
        let prev = prev_line - prev_reference;
        let current = line - reference;
        if prev <= 0.0 && current > 0.0 {
            Self::BullishCrossover
        } else if prev >= 0.0 && current < 0.0 {
            Self::BearishCrossover
        } else {
            Self::None
        }
    }
}

/// Short-horizon change of an oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Momentum {
    Increasing,
    Decreasing,
    Stable,
}

impl Momentum {
    /// Classify `change` against a symmetric `threshold`.
    pub fn from_change(change: f64, threshold: f64) -> Self {
        if change > threshold {
            Self::Increasing
        } else if change < -threshold {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

/// Price / indicator divergence classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Divergence {
    BullishDivergence,
    BearishDivergence,
    NoDivergence,
}

impl std::fmt::Display for ZoneSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullishDivergence => write!(f, "BULLISH_DIVERGENCE"),
            Self::BearishDivergence => write!(f, "BEARISH_DIVERGENCE"),
            Self::NoDivergence => write!(f, "NO_DIVERGENCE"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_accepts_valid_bars() {
        let bars = vec![
            PriceBar::new(10.0, 12.0, 9.0, 11.0, 100.0),
            PriceBar::new(11.0, 11.5, 10.5, 11.0, 0.0),
        ];
        let series = PriceSeries::new(bars).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![11.0, 11.0]);
        assert!((series.typical_prices()[0] - 32.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn series_rejects_close_above_high() {
        let bars = vec![
            PriceBar::new(10.0, 12.0, 9.0, 11.0, 1.0),
            PriceBar::new(10.0, 12.0, 9.0, 13.0, 1.0),
        ];
        let err = PriceSeries::new(bars).unwrap_err();
        match err {
            IndicatorError::InvalidPriceData(msg) => assert!(msg.starts_with("bar 1")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn series_rejects_negative_volume_and_nan() {
        assert!(PriceSeries::new(vec![PriceBar::new(1.0, 1.0, 1.0, 1.0, -1.0)]).is_err());
        assert!(PriceSeries::new(vec![PriceBar::new(1.0, f64::NAN, 1.0, 1.0, 1.0)]).is_err());
    }

    #[test]
    fn series_deserialises_with_validation() {
        let ok: PriceSeries =
            serde_json::from_str(r#"[{"open":1,"high":2,"low":0.5,"close":1.5}]"#).unwrap();
        assert_eq!(ok.bars()[0].volume, 0.0);

        let bad = serde_json::from_str::<PriceSeries>(
            r#"[{"open":1,"high":2,"low":3,"close":1.5,"volume":1}]"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn crossover_detection() {
        assert_eq!(Crossover::detect(1.0, 1.0, 2.0, 1.0), Crossover::BullishCrossover);
        assert_eq!(Crossover::detect(2.0, 1.0, 0.5, 1.0), Crossover::BearishCrossover);
        assert_eq!(Crossover::detect(2.0, 1.0, 3.0, 1.0), Crossover::None);
    }

    #[test]
    fn modes_use_snake_case() {
        assert_eq!(serde_json::to_string(&OutputMode::FullData).unwrap(), "\"full_data\"");
        assert_eq!(serde_json::from_str::<QueryMode>("\"full\"").unwrap(), QueryMode::Full);
    }
}
