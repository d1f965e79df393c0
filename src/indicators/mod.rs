// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free calculators. Every calculator produces the FULL
// aligned result sequence for a series; "latest value" is just the last
// element, so the two query modes can never disagree.
//
// Alignment: `values[i]` belongs to bar `offset + i`, where `offset` is the
// calculator's warm-up. A series must hold at least `offset + 1` bars.

pub mod divergence;
pub mod params;
pub mod rolling;

pub mod adx;
pub mod atr;
pub mod awesome_oscillator;
pub mod bollinger;
pub mod cmf;
pub mod force_index;
pub mod ichimoku;
pub mod keltner;
pub mod macd;
pub mod mfi;
pub mod moving_average;
pub mod obv;
pub mod parabolic_sar;
pub mod rsi;
pub mod stochastic;
pub mod stochastic_rsi;
pub mod vwap;
pub mod williams_r;

use serde::Serialize;

use crate::error::IndicatorError;
use crate::types::{PriceSeries, QueryMode};

pub use params::IndicatorParams;

use self::adx::{Adx, AdxResult};
use self::atr::{Atr, AtrResult};
use self::awesome_oscillator::{AwesomeOscillator, AwesomeOscillatorResult};
use self::bollinger::{BollingerBands, BollingerResult};
use self::cmf::{Cmf, CmfResult};
use self::force_index::{ForceIndex, ForceIndexResult};
use self::ichimoku::{Ichimoku, IchimokuResult};
use self::keltner::{KeltnerChannel, KeltnerResult};
use self::macd::{Macd, MacdResult};
use self::mfi::{Mfi, MfiResult};
use self::moving_average::{MovingAverage, MovingAverageResult};
use self::obv::{Obv, ObvResult};
use self::parabolic_sar::{ParabolicSar, ParabolicSarResult};
use self::rsi::{Rsi, RsiResult};
use self::stochastic::{Stochastic, StochasticResult};
use self::stochastic_rsi::{StochasticRsi, StochasticRsiResult};
use self::vwap::{Vwap, VwapResult};
use self::williams_r::{WilliamsR, WilliamsRResult};

// =============================================================================
// Calculator contract
// =============================================================================

/// One indicator family with fixed parameters.
pub trait Indicator {
    /// Per-bar result record.
    type Output: Clone + Serialize;

    /// Display name used in error messages.
    fn name(&self) -> &'static str;

    /// Index of the first bar that gets a result.
    fn warmup(&self) -> usize;

    fn min_bars(&self) -> usize {
        self.warmup().saturating_add(1)
    }

    /// Produce the aligned sequence. Only called once the length check in
    /// [`Indicator::calculate`] has passed.
    fn compute(&self, series: &PriceSeries) -> Vec<Self::Output>;

    /// Validate the series length, then compute.
    fn calculate(
        &self,
        series: &PriceSeries,
    ) -> Result<ResultSeries<Self::Output>, IndicatorError> {
        let required = self.min_bars();
        if series.len() < required {
            return Err(IndicatorError::insufficient(
                self.name(),
                required,
                series.len(),
            ));
        }
        Ok(ResultSeries::new(self.warmup(), self.compute(series)))
    }
}

// =============================================================================
// Result sequences
// =============================================================================

/// Aligned per-bar results: `values[i]` belongs to bar `offset + i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSeries<T> {
    pub offset: usize,
    pub values: Vec<T>,
}

impl<T> ResultSeries<T> {
    pub fn new(offset: usize, values: Vec<T>) -> Self {
        Self { offset, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.last()
    }

    /// Bar index of `values[i]`.
    pub fn bar_index(&self, i: usize) -> usize {
        self.offset + i
    }

    /// Copy of the last element only, offset adjusted.
    pub fn latest_only(&self) -> Self
    where
        T: Clone,
    {
        let skipped = self.values.len().saturating_sub(1);
        Self::new(self.offset + skipped, self.values[skipped..].to_vec())
    }

    /// Keep everything (`Full`) or only the last element (`Latest`), with the
    /// offset moved so alignment is preserved.
    pub fn select(mut self, mode: QueryMode) -> Self {
        if mode == QueryMode::Latest && self.values.len() > 1 {
            let drop = self.values.len() - 1;
            self.values.drain(..drop);
            self.offset += drop;
        }
        self
    }
}

// =============================================================================
// Closed set of calculators
// =============================================================================

macro_rules! calculators {
    ($($variant:ident($indicator:ty) => $output:ty),+ $(,)?) => {
        /// A constructed calculator, as handed out by the registry.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Calculator {
            $($variant($indicator)),+
        }

        /// The result sequence of any calculator, tagged by family.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "indicator", content = "series", rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum IndicatorSeries {
            $($variant(ResultSeries<$output>)),+
        }

        impl Calculator {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(inner) => inner.name()),+
                }
            }

            pub fn warmup(&self) -> usize {
                match self {
                    $(Self::$variant(inner) => inner.warmup()),+
                }
            }

            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(inner) => inner.min_bars()),+
                }
            }

            pub fn calculate(&self, series: &PriceSeries) -> Result<IndicatorSeries, IndicatorError> {
                match self {
                    $(Self::$variant(inner) => inner.calculate(series).map(IndicatorSeries::$variant)),+
                }
            }
        }

        impl IndicatorSeries {
            pub fn offset(&self) -> usize {
                match self {
                    $(Self::$variant(s) => s.offset),+
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(Self::$variant(s) => s.len()),+
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn select(self, mode: QueryMode) -> Self {
                match self {
                    $(Self::$variant(s) => Self::$variant(s.select(mode))),+
                }
            }

            pub fn latest_only(&self) -> Self {
                match self {
                    $(Self::$variant(s) => Self::$variant(s.latest_only())),+
                }
            }

            fn family(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($variant)),+
                }
            }
        }

        $(
            impl From<$indicator> for Calculator {
                fn from(indicator: $indicator) -> Self {
                    Self::$variant(indicator)
                }
            }

            impl TryFrom<IndicatorSeries> for ResultSeries<$output> {
                type Error = IndicatorError;

                fn try_from(series: IndicatorSeries) -> Result<Self, Self::Error> {
                    match series {
                        IndicatorSeries::$variant(inner) => Ok(inner),
                        other => Err(IndicatorError::invalid_params(format!(
                            "expected {} results, got {}",
                            stringify!($variant),
                            other.family()
                        ))),
                    }
                }
            }
        )+
    };
}

calculators! {
    Rsi(Rsi) => RsiResult,
    Macd(Macd) => MacdResult,
    MovingAverage(MovingAverage) => MovingAverageResult,
    Bollinger(BollingerBands) => BollingerResult,
    Stochastic(Stochastic) => StochasticResult,
    WilliamsR(WilliamsR) => WilliamsRResult,
    Obv(Obv) => ObvResult,
    Mfi(Mfi) => MfiResult,
    Cmf(Cmf) => CmfResult,
    Vwap(Vwap) => VwapResult,
    Atr(Atr) => AtrResult,
    Adx(Adx) => AdxResult,
    Ichimoku(Ichimoku) => IchimokuResult,
    ParabolicSar(ParabolicSar) => ParabolicSarResult,
    StochasticRsi(StochasticRsi) => StochasticRsiResult,
    AwesomeOscillator(AwesomeOscillator) => AwesomeOscillatorResult,
    ForceIndex(ForceIndex) => ForceIndexResult,
    Keltner(KeltnerChannel) => KeltnerResult,
}

// =============================================================================
// Test helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{PriceBar, PriceSeries};

    /// Bar centred on `close` with a fixed half-range.
    pub fn bar(close: f64, volume: f64) -> PriceBar {
        PriceBar::new(close, close + 1.0, close - 1.0, close, volume)
    }

    /// Series built from closes with constant volume.
    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        PriceSeries::new(closes.iter().map(|&c| bar(c, 1_000.0)).collect())
            .expect("valid test bars")
    }

    /// Strictly rising closes `start, start + step, ...`.
    pub fn rising(len: usize, start: f64, step: f64) -> PriceSeries {
        let closes: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
        series_from_closes(&closes)
    }

    /// Deterministic zig-zag around 100 that never settles.
    pub fn wave(len: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..len)
            .map(|i| 100.0 + 10.0 * ((i as f64) * 0.37).sin() + 3.0 * ((i as f64) * 1.3).cos())
            .collect();
        series_from_closes(&closes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    #[test]
    fn select_latest_moves_offset() {
        let full = ResultSeries::new(3, vec![1, 2, 3, 4]);
        let latest = full.clone().select(QueryMode::Latest);
        assert_eq!(latest.values, vec![4]);
        assert_eq!(latest.offset, 6);
        assert_eq!(latest.bar_index(0), full.bar_index(3));
        assert_eq!(full.clone().select(QueryMode::Full), full);
        assert_eq!(full.latest_only(), latest);
    }

    #[test]
    fn huge_windows_report_insufficient_data() {
        let series = wave(60);
        let adx = adx::Adx { period: usize::MAX };
        assert_eq!(adx.min_bars(), usize::MAX);
        assert!(matches!(
            adx.calculate(&series),
            Err(IndicatorError::InsufficientData { .. })
        ));
        let stoch = stochastic::Stochastic {
            k_period: usize::MAX,
            d_period: 3,
            slowing: 3,
        };
        assert!(matches!(
            stoch.calculate(&series),
            Err(IndicatorError::InsufficientData { .. })
        ));
        let macd = macd::Macd {
            fast: 12,
            slow: usize::MAX,
            signal: 9,
        };
        assert!(matches!(
            macd.calculate(&series),
            Err(IndicatorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn calculator_reports_insufficient_data() {
        let calc = Calculator::from(Rsi::default());
        let err = calc.calculate(&rising(14, 100.0, 1.0)).unwrap_err();
        assert_eq!(err, IndicatorError::insufficient("RSI", 15, 14));
    }

    #[test]
    fn typed_conversion_checks_family() {
        let calc = Calculator::from(Rsi::default());
        let series = calc.calculate(&rising(30, 100.0, 1.0)).unwrap();
        assert!(ResultSeries::<MacdResult>::try_from(series.clone()).is_err());
        let rsi = ResultSeries::<RsiResult>::try_from(series).unwrap();
        assert_eq!(rsi.offset, 14);
    }

    #[test]
    fn series_serialises_with_family_tag() {
        let calc = Calculator::from(Obv);
        let series = calc.calculate(&rising(5, 100.0, 1.0)).unwrap();
        let json = serde_json::to_value(series.select(QueryMode::Latest)).unwrap();
        assert_eq!(json["indicator"], "OBV");
        assert_eq!(json["series"]["offset"], 4);
    }
}
