// =============================================================================
// Composite Analysis - one verdict from the indicator battery
// =============================================================================
//
// Runs a fixed battery of calculators over one series, keeps the latest value
// of each, scores them with fixed weights and derives a confidence figure:
//
//   base        = |normalized_score| * 100
//   volume      : x1.2 (cap 100) when VWAP, OBV, MFI and CMF all agree with
//                 the score direction
//   contradict  : x0.8 when >= 2 oscillators sit in the opposite zone
//   confirm     : x1.15 (cap 100) when >= 3 oscillators agree (zone or
//                 divergence)
//
// A zero score has no direction, so none of the adjustments apply.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::weighted_score::{OverallSignal, ScoringResult, SignalContribution, WeightedScorer};
use crate::error::IndicatorError;
use crate::indicators::bollinger::{BollingerResult, BollingerSignal, VolatilityLevel};
use crate::indicators::cmf::{CmfResult, FlowType};
use crate::indicators::macd::MacdResult;
use crate::indicators::mfi::{MfiResult, MoneyFlow};
use crate::indicators::moving_average::{MaPosition, MaTrend, MovingAverageResult};
use crate::indicators::obv::{ObvResult, ObvSignal};
use crate::indicators::rsi::RsiResult;
use crate::indicators::stochastic::StochasticResult;
use crate::indicators::vwap::{VolumeProfile, VwapResult};
use crate::indicators::williams_r::WilliamsRResult;
use crate::indicators::{IndicatorSeries, ResultSeries};
use crate::registry::IndicatorRegistry;
use crate::types::{Bias, Crossover, Divergence, OutputMode, PriceSeries, Strength, ZoneSignal};

/// Minimum number of bars for a composite analysis (covers MA200).
pub const MIN_ANALYSIS_BARS: usize = 200;

const ANALYSIS_NAME: &str = "COMPOSITE_ANALYSIS";

/// Calculators run by every analysis, by registry name.
pub const BATTERY: &[&str] = &[
    "RSI",
    "MACD",
    "MA20",
    "MA50",
    "MA200",
    "VWAP",
    "OBV",
    "MFI",
    "CMF",
    "BOLLINGER",
    "STOCHASTIC",
    "WILLIAMS_R",
];

const RSI_WEIGHT: f64 = 2.0;
const MACD_WEIGHT: f64 = 3.0;
const MA_WEIGHT: f64 = 3.0;
const VWAP_WEIGHT: f64 = 1.0;
const OBV_WEIGHT: f64 = 1.0;
const MFI_WEIGHT: f64 = 1.0;
const CMF_WEIGHT: f64 = 1.0;
const BOLLINGER_WEIGHT: f64 = 2.0;
const STOCHASTIC_WEIGHT: f64 = 2.0;
const WILLIAMS_WEIGHT: f64 = 2.0;

const VOLUME_CONFIRMATION_BOOST: f64 = 1.2;
const CONTRADICTION_PENALTY: f64 = 0.8;
const CONFIRMATION_BOOST: f64 = 1.15;
const MIN_CONTRADICTIONS: usize = 2;
const MIN_CONFIRMATIONS: usize = 3;

// -----------------------------------------------------------------------------
// Output
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverages {
    pub ma20: MovingAverageResult,
    pub ma50: MovingAverageResult,
    pub ma200: MovingAverageResult,
}

/// Latest value of every indicator in the battery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: RsiResult,
    pub macd: MacdResult,
    pub moving_averages: MovingAverages,
    pub vwap: VwapResult,
    pub obv: ObvResult,
    pub mfi: MfiResult,
    pub cmf: CmfResult,
    pub bollinger: BollingerResult,
    pub stochastic: StochasticResult,
    pub williams_r: WilliamsRResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeAnalysis {
    pub symbol: String,
    pub current_price: f64,
    pub bars_analyzed: usize,
    pub overall_signal: OverallSignal,
    /// 0..=100.
    pub confidence: u32,
    pub volume_confirmation: bool,
    pub volatility_level: VolatilityLevel,
    pub score: f64,
    pub max_score: f64,
    pub normalized_score: f64,
    pub oscillator_confirmations: usize,
    pub oscillator_contradictions: usize,
    pub indicators: IndicatorSnapshot,
    pub contributions: Vec<SignalContribution>,
    /// Every calculator's full aligned sequence, only for `OutputMode::FullData`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_data: Option<BTreeMap<String, IndicatorSeries>>,
}

// -----------------------------------------------------------------------------
// Analyzer
// -----------------------------------------------------------------------------

pub struct CompositeAnalyzer<'a> {
    registry: &'a IndicatorRegistry,
    scorer: WeightedScorer,
}

impl<'a> CompositeAnalyzer<'a> {
    pub fn new(registry: &'a IndicatorRegistry) -> Self {
        Self {
            registry,
            scorer: WeightedScorer::default(),
        }
    }

    /// # Errors
    /// - `InsufficientData` when the series holds fewer than 200 bars
    pub fn analyze(
        &self,
        series: &PriceSeries,
        symbol: &str,
        output_mode: OutputMode,
    ) -> Result<CompositeAnalysis, IndicatorError> {
        let current_price = match series.last() {
            Some(bar) if series.len() >= MIN_ANALYSIS_BARS => bar.close,
            _ => {
                return Err(IndicatorError::insufficient(
                    ANALYSIS_NAME,
                    MIN_ANALYSIS_BARS,
                    series.len(),
                ))
            }
        };

        let mut runs = BTreeMap::new();
        for name in BATTERY {
            let calculator = self.registry.create(name, None)?;
            runs.insert(name.to_string(), calculator.calculate(series)?);
        }

        let snapshot = IndicatorSnapshot {
            rsi: latest(&runs, "RSI")?,
            macd: latest(&runs, "MACD")?,
            moving_averages: MovingAverages {
                ma20: latest(&runs, "MA20")?,
                ma50: latest(&runs, "MA50")?,
                ma200: latest(&runs, "MA200")?,
            },
            vwap: latest(&runs, "VWAP")?,
            obv: latest(&runs, "OBV")?,
            mfi: latest(&runs, "MFI")?,
            cmf: latest(&runs, "CMF")?,
            bollinger: latest(&runs, "BOLLINGER")?,
            stochastic: latest(&runs, "STOCHASTIC")?,
            williams_r: latest(&runs, "WILLIAMS_R")?,
        };

        let scoring = self.scorer.score(contributions(&snapshot));
        let direction = scoring.direction();
        let volume_confirmation = direction.is_some_and(|d| volume_confirms(&snapshot, d));
        let (confirmations, contradictions) = match direction {
            Some(d) => oscillator_agreement(&snapshot, d),
            None => (0, 0),
        };
        let confidence = confidence(
            scoring.normalized_score,
            volume_confirmation,
            contradictions,
            confirmations,
        );

        debug!(
            symbol,
            bars = series.len(),
            score = scoring.score,
            normalized = scoring.normalized_score,
            signal = %scoring.overall_signal,
            confidence,
            volume_confirmation,
            "composite analysis complete"
        );

        let ScoringResult {
            score,
            max_score,
            normalized_score,
            overall_signal,
            contributions,
        } = scoring;

        Ok(CompositeAnalysis {
            symbol: symbol.to_string(),
            current_price,
            bars_analyzed: series.len(),
            overall_signal,
            confidence,
            volume_confirmation,
            volatility_level: snapshot.bollinger.volatility,
            score,
            max_score,
            normalized_score,
            oscillator_confirmations: confirmations,
            oscillator_contradictions: contradictions,
            indicators: snapshot,
            contributions,
            full_data: match output_mode {
                OutputMode::FullData => Some(runs),
                OutputMode::Summary => None,
            },
        })
    }
}

/// Latest typed value of one battery run.
fn latest<T: Clone>(runs: &BTreeMap<String, IndicatorSeries>, name: &str) -> Result<T, IndicatorError>
where
    ResultSeries<T>: TryFrom<IndicatorSeries, Error = IndicatorError>,
{
    let run = runs
        .get(name)
        .ok_or_else(|| IndicatorError::UnknownIndicator(name.to_string()))?;
    let typed = ResultSeries::<T>::try_from(run.latest_only())?;
    typed
        .latest()
        .cloned()
        .ok_or_else(|| IndicatorError::insufficient(name, 1, 0))
}

// -----------------------------------------------------------------------------
// Scoring rules
// -----------------------------------------------------------------------------

fn contributions(s: &IndicatorSnapshot) -> Vec<SignalContribution> {
    vec![
        rsi_vote(&s.rsi),
        macd_vote(&s.macd),
        moving_average_vote(&s.moving_averages),
        vwap_vote(&s.vwap),
        obv_vote(&s.obv),
        mfi_vote(&s.mfi),
        cmf_vote(&s.cmf),
        bollinger_vote(&s.bollinger),
        stochastic_vote(&s.stochastic),
        williams_vote(&s.williams_r),
    ]
}

fn rsi_vote(rsi: &RsiResult) -> SignalContribution {
    let magnitude = if rsi.strength == Strength::Strong { 2.0 } else { 1.0 };
    let (points, reason) = match rsi.signal {
        ZoneSignal::Oversold => (magnitude, format!("RSI {:.1} oversold", rsi.rsi)),
        ZoneSignal::Overbought => (-magnitude, format!("RSI {:.1} overbought", rsi.rsi)),
        ZoneSignal::Neutral => (0.0, format!("RSI {:.1} neutral", rsi.rsi)),
    };
    SignalContribution::new("RSI", RSI_WEIGHT, points, reason)
}

fn macd_vote(macd: &MacdResult) -> SignalContribution {
    let (points, reason) = match (macd.crossover, macd.trend) {
        (Crossover::BullishCrossover, _) => (3.0, "bullish crossover"),
        (Crossover::BearishCrossover, _) => (-3.0, "bearish crossover"),
        (Crossover::None, Bias::Bullish) => (1.0, "MACD above zero"),
        (Crossover::None, Bias::Bearish) => (-1.0, "MACD below zero"),
        (Crossover::None, Bias::Neutral) => (0.0, "MACD flat"),
    };
    SignalContribution::new("MACD", MACD_WEIGHT, points, reason)
}

/// One point per average with price and slope pointing the same way.
fn moving_average_vote(mas: &MovingAverages) -> SignalContribution {
    let mut points = 0.0;
    let mut aligned = Vec::new();
    for ma in [&mas.ma20, &mas.ma50, &mas.ma200] {
        match (ma.position, ma.trend) {
            (MaPosition::Above, MaTrend::Uptrend) => {
                points += 1.0;
                aligned.push(format!("MA{} up", ma.period));
            }
            (MaPosition::Below, MaTrend::Downtrend) => {
                points -= 1.0;
                aligned.push(format!("MA{} down", ma.period));
            }
            _ => {}
        }
    }
    let reason = if aligned.is_empty() {
        "no aligned averages".to_string()
    } else {
        aligned.join(", ")
    };
    SignalContribution::new("MOVING_AVERAGES", MA_WEIGHT, points, reason)
}

fn vwap_vote(vwap: &VwapResult) -> SignalContribution {
    let high_volume = vwap.volume_profile == VolumeProfile::HighVolumeArea;
    let points = match vwap.bias {
        Bias::Bullish if high_volume => 1.0,
        Bias::Bearish if high_volume => -1.0,
        _ => 0.0,
    };
    let reason = format!("{:+.2}% from VWAP", vwap.distance_percent);
    SignalContribution::new("VWAP", VWAP_WEIGHT, points, reason)
}

fn obv_vote(obv: &ObvResult) -> SignalContribution {
    let points = if obv.signal == ObvSignal::Buy || obv.divergence == Divergence::BullishDivergence
    {
        1.0
    } else if obv.signal == ObvSignal::Sell || obv.divergence == Divergence::BearishDivergence {
        -1.0
    } else {
        0.0
    };
    let reason = format!("OBV {:?}, {}", obv.signal, obv.divergence);
    SignalContribution::new("OBV", OBV_WEIGHT, points, reason)
}

fn mfi_vote(mfi: &MfiResult) -> SignalContribution {
    let points = match (mfi.signal, mfi.money_flow) {
        (ZoneSignal::Oversold, MoneyFlow::Positive) => 1.0,
        (ZoneSignal::Overbought, MoneyFlow::Negative) => -1.0,
        _ => 0.0,
    };
    let reason = format!("MFI {:.1} {}", mfi.mfi, mfi.signal);
    SignalContribution::new("MFI", MFI_WEIGHT, points, reason)
}

fn cmf_vote(cmf: &CmfResult) -> SignalContribution {
    let points = match cmf.flow_type {
        _ if cmf.strength == Strength::Weak => 0.0,
        FlowType::Accumulation => 1.0,
        FlowType::Distribution => -1.0,
        FlowType::Neutral => 0.0,
    };
    let reason = format!("CMF {:.3}", cmf.cmf);
    SignalContribution::new("CMF", CMF_WEIGHT, points, reason)
}

fn bollinger_vote(bb: &BollingerResult) -> SignalContribution {
    let (points, reason) = match bb.signal {
        BollingerSignal::Squeeze => (0.0, "squeeze, direction pending"),
        BollingerSignal::Oversold => (2.0, "price below lower band"),
        BollingerSignal::Overbought => (-2.0, "price above upper band"),
        BollingerSignal::Neutral if bb.percent_b <= 0.2 => (1.0, "near lower band"),
        BollingerSignal::Neutral if bb.percent_b >= 0.8 => (-1.0, "near upper band"),
        BollingerSignal::Neutral => (0.0, "inside bands"),
    };
    SignalContribution::new("BOLLINGER", BOLLINGER_WEIGHT, points, reason)
}

fn stochastic_vote(stoch: &StochasticResult) -> SignalContribution {
    let points = zone_points(stoch.signal)
        + match stoch.crossover {
            Crossover::BullishCrossover => 1.0,
            Crossover::BearishCrossover => -1.0,
            Crossover::None => 0.0,
        }
        + divergence_points(stoch.divergence);
    let reason = format!(
        "%K {:.1} / %D {:.1}, {}",
        stoch.k_percent, stoch.d_percent, stoch.divergence
    );
    SignalContribution::new("STOCHASTIC", STOCHASTIC_WEIGHT, points, reason)
}

/// Momentum only counts while a reversal is under way.
fn williams_vote(wr: &WilliamsRResult) -> SignalContribution {
    let momentum = if wr.reversal_signal.is_reversal() {
        match wr.momentum {
            Bias::Bullish => 1.0,
            Bias::Bearish => -1.0,
            Bias::Neutral => 0.0,
        }
    } else {
        0.0
    };
    let points = zone_points(wr.signal) + divergence_points(wr.divergence) + momentum;
    let reason = format!("%R {:.1} {}, {}", wr.williams_r, wr.signal, wr.divergence);
    SignalContribution::new("WILLIAMS_R", WILLIAMS_WEIGHT, points, reason)
}

fn zone_points(signal: ZoneSignal) -> f64 {
    match signal {
        ZoneSignal::Oversold => 1.0,
        ZoneSignal::Overbought => -1.0,
        ZoneSignal::Neutral => 0.0,
    }
}

fn divergence_points(divergence: Divergence) -> f64 {
    match divergence {
        Divergence::BullishDivergence => 1.0,
        Divergence::BearishDivergence => -1.0,
        Divergence::NoDivergence => 0.0,
    }
}

// -----------------------------------------------------------------------------
// Confirmation and confidence
// -----------------------------------------------------------------------------

fn volume_confirms(s: &IndicatorSnapshot, direction: Bias) -> bool {
    match direction {
        Bias::Bullish => {
            s.vwap.bias == Bias::Bullish
                && s.obv.signal == ObvSignal::Buy
                && s.mfi.money_flow == MoneyFlow::Positive
                && s.cmf.flow_type == FlowType::Accumulation
        }
        Bias::Bearish => {
            s.vwap.bias == Bias::Bearish
                && s.obv.signal == ObvSignal::Sell
                && s.mfi.money_flow == MoneyFlow::Negative
                && s.cmf.flow_type == FlowType::Distribution
        }
        Bias::Neutral => false,
    }
}

/// Oversold reads bullish, overbought bearish.
fn zone_bias(signal: ZoneSignal) -> Option<Bias> {
    match signal {
        ZoneSignal::Oversold => Some(Bias::Bullish),
        ZoneSignal::Overbought => Some(Bias::Bearish),
        ZoneSignal::Neutral => None,
    }
}

fn divergence_bias(divergence: Divergence) -> Option<Bias> {
    match divergence {
        Divergence::BullishDivergence => Some(Bias::Bullish),
        Divergence::BearishDivergence => Some(Bias::Bearish),
        Divergence::NoDivergence => None,
    }
}

/// `(confirming, contradicting)` oscillator counts over RSI, Stochastic,
/// Williams %R and Bollinger.
fn oscillator_agreement(s: &IndicatorSnapshot, direction: Bias) -> (usize, usize) {
    let bollinger_zone = match s.bollinger.signal {
        BollingerSignal::Oversold => ZoneSignal::Oversold,
        BollingerSignal::Overbought => ZoneSignal::Overbought,
        BollingerSignal::Squeeze | BollingerSignal::Neutral => ZoneSignal::Neutral,
    };
    let readings = [
        (zone_bias(s.rsi.signal), None),
        (
            zone_bias(s.stochastic.signal),
            divergence_bias(s.stochastic.divergence),
        ),
        (
            zone_bias(s.williams_r.signal),
            divergence_bias(s.williams_r.divergence),
        ),
        (zone_bias(bollinger_zone), None),
    ];

    let mut confirmations = 0;
    let mut contradictions = 0;
    for (zone, divergence) in readings {
        if zone == Some(direction) || divergence == Some(direction) {
            confirmations += 1;
        }
        if zone.is_some_and(|z| z != direction) {
            contradictions += 1;
        }
    }
    (confirmations, contradictions)
}

fn confidence(
    normalized_score: f64,
    volume_confirmation: bool,
    contradictions: usize,
    confirmations: usize,
) -> u32 {
    let mut confidence = normalized_score.abs() * 100.0;
    if volume_confirmation {
        confidence = (confidence * VOLUME_CONFIRMATION_BOOST).min(100.0);
    }
    if contradictions >= MIN_CONTRADICTIONS {
        confidence *= CONTRADICTION_PENALTY;
    }
    if confirmations >= MIN_CONFIRMATIONS {
        confidence = (confidence * CONFIRMATION_BOOST).min(100.0);
    }
    confidence.round().clamp(0.0, 100.0) as u32
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::bollinger::{BandPosition, SqueezeStatus};
    use crate::indicators::cmf::Pressure;
    use crate::indicators::obv::ObvTrend;
    use crate::indicators::test_support::*;
    use crate::indicators::vwap::VwapPosition;
    use crate::indicators::williams_r::ReversalSignal;
    use crate::types::{Momentum, ZonePosition};

    fn analyze(series: &PriceSeries, mode: OutputMode) -> Result<CompositeAnalysis, IndicatorError> {
        let registry = IndicatorRegistry::new();
        CompositeAnalyzer::new(&registry).analyze(series, "BTCUSDT", mode)
    }

    #[test]
    fn needs_two_hundred_bars() {
        let err = analyze(&wave(199), OutputMode::Summary).unwrap_err();
        assert_eq!(err, IndicatorError::insufficient(ANALYSIS_NAME, 200, 199));
        assert!(analyze(&wave(200), OutputMode::Summary).is_ok());
    }

    #[test]
    fn summary_carries_every_vote() {
        let analysis = analyze(&wave(260), OutputMode::Summary).unwrap();
        assert_eq!(analysis.max_score, 18.0);
        assert_eq!(analysis.contributions.len(), 10);
        assert!(analysis
            .contributions
            .iter()
            .all(|c| c.points.abs() <= c.weight));
        assert!(analysis.confidence <= 100);
        assert!(analysis.full_data.is_none());
        assert_eq!(analysis.bars_analyzed, 260);
        assert_eq!(analysis.volatility_level, analysis.indicators.bollinger.volatility);
    }

    #[test]
    fn full_data_attaches_aligned_sequences() {
        let series = wave(220);
        let analysis = analyze(&series, OutputMode::FullData).unwrap();
        let full = analysis.full_data.unwrap();
        assert_eq!(full.len(), BATTERY.len());
        assert_eq!(full["RSI"].len(), 220 - 14);
        assert_eq!(full["MA200"].len(), 21);
        for run in full.values() {
            assert_eq!(run.offset() + run.len(), 220);
        }
    }

    #[test]
    fn verdict_follows_normalized_score() {
        let analysis = analyze(&rising(250, 100.0, 1.0), OutputMode::Summary).unwrap();
        let expected = WeightedScorer::default().classify(analysis.normalized_score);
        assert_eq!(analysis.overall_signal, expected);
        assert!((analysis.normalized_score - analysis.score / 18.0).abs() < 1e-12);
    }

    #[test]
    fn analysis_is_deterministic() {
        let series = wave(240);
        assert_eq!(
            analyze(&series, OutputMode::FullData).unwrap(),
            analyze(&series, OutputMode::FullData).unwrap()
        );
    }

    #[test]
    fn confidence_pipeline_order() {
        // 0.5 -> 60 (volume) -> 48 (contradictions) -> 55.2 (confirmations)
        assert_eq!(confidence(0.5, true, 2, 3), 55);
        assert_eq!(confidence(-0.5, false, 0, 0), 50);
        assert_eq!(confidence(0.9, true, 0, 3), 100);
        assert_eq!(confidence(0.0, false, 4, 0), 0);
        assert_eq!(confidence(1.0, false, 2, 0), 80);
    }

    #[test]
    fn moving_average_vote_needs_price_and_slope() {
        let ma = |period, position, trend| MovingAverageResult {
            period,
            sma: 0.0,
            ema: 0.0,
            position,
            trend,
        };
        let mas = MovingAverages {
            ma20: ma(20, MaPosition::Above, MaTrend::Uptrend),
            ma50: ma(50, MaPosition::Above, MaTrend::Sideways),
            ma200: ma(200, MaPosition::Below, MaTrend::Downtrend),
        };
        let vote = moving_average_vote(&mas);
        assert_eq!(vote.points, 0.0);
        assert_eq!(vote.reason, "MA20 up, MA200 down");
    }

    #[test]
    fn macd_crossover_outweighs_trend() {
        let macd = MacdResult {
            macd: -0.5,
            signal: -0.7,
            histogram: 0.2,
            trend: Bias::Bearish,
            crossover: Crossover::BullishCrossover,
        };
        assert_eq!(macd_vote(&macd).points, 3.0);
        let drifting = MacdResult {
            crossover: Crossover::None,
            ..macd
        };
        assert_eq!(macd_vote(&drifting).points, -1.0);
    }

    #[test]
    fn rsi_strength_scales_vote() {
        let rsi = RsiResult {
            rsi: 15.0,
            rs: 0.18,
            avg_gain: 0.1,
            avg_loss: 0.6,
            signal: ZoneSignal::Oversold,
            strength: Strength::Strong,
        };
        assert_eq!(rsi_vote(&rsi).points, 2.0);
        let moderate = RsiResult {
            rsi: 75.0,
            signal: ZoneSignal::Overbought,
            strength: Strength::Moderate,
            ..rsi
        };
        assert_eq!(rsi_vote(&moderate).points, -1.0);
    }

    // -------------------------------------------------------------------------
    // Snapshot fixtures
    // -------------------------------------------------------------------------

    /// Every reading neutral: no zone, no flow, no divergence.
    fn quiet_snapshot() -> IndicatorSnapshot {
        let ma = |period| MovingAverageResult {
            period,
            sma: 100.0,
            ema: 100.0,
            position: MaPosition::Above,
            trend: MaTrend::Sideways,
        };
        IndicatorSnapshot {
            rsi: RsiResult {
                rsi: 50.0,
                rs: 1.0,
                avg_gain: 1.0,
                avg_loss: 1.0,
                signal: ZoneSignal::Neutral,
                strength: Strength::Weak,
            },
            macd: MacdResult {
                macd: 0.0,
                signal: 0.0,
                histogram: 0.0,
                trend: Bias::Neutral,
                crossover: Crossover::None,
            },
            moving_averages: MovingAverages {
                ma20: ma(20),
                ma50: ma(50),
                ma200: ma(200),
            },
            vwap: VwapResult {
                vwap: 100.0,
                position: VwapPosition::AtVwap,
                bias: Bias::Neutral,
                distance_percent: 0.0,
                volume_profile: VolumeProfile::AverageVolume,
            },
            obv: ObvResult {
                obv: 0.0,
                trend: ObvTrend::Sideways,
                signal: ObvSignal::Hold,
                strength: Strength::Weak,
                divergence: Divergence::NoDivergence,
            },
            mfi: MfiResult {
                mfi: 50.0,
                signal: ZoneSignal::Neutral,
                strength: Strength::Weak,
                money_flow: MoneyFlow::Balanced,
                divergence: Divergence::NoDivergence,
            },
            cmf: CmfResult {
                cmf: 0.0,
                flow_type: FlowType::Neutral,
                strength: Strength::Weak,
                pressure: Pressure::Balanced,
                divergence: Divergence::NoDivergence,
            },
            bollinger: BollingerResult {
                middle: 100.0,
                upper: 104.0,
                lower: 96.0,
                width: 8.0,
                percent_b: 0.5,
                signal: BollingerSignal::Neutral,
                position: BandPosition::AtMiddle,
                volatility: VolatilityLevel::Low,
                squeeze_status: SqueezeStatus::Normal,
            },
            stochastic: StochasticResult {
                k_percent: 50.0,
                d_percent: 50.0,
                signal: ZoneSignal::Neutral,
                crossover: Crossover::None,
                position: ZonePosition::Neutral,
                divergence: Divergence::NoDivergence,
                momentum: Momentum::Stable,
            },
            williams_r: WilliamsRResult {
                williams_r: -50.0,
                signal: ZoneSignal::Neutral,
                position: ZonePosition::Neutral,
                momentum: Bias::Neutral,
                reversal_signal: ReversalSignal::NoReversal,
                trend_strength: Strength::Moderate,
                divergence: Divergence::NoDivergence,
            },
        }
    }

    /// VWAP, OBV, MFI and CMF all reading as buying.
    fn accumulating_snapshot() -> IndicatorSnapshot {
        let mut s = quiet_snapshot();
        s.vwap.bias = Bias::Bullish;
        s.obv.signal = ObvSignal::Buy;
        s.mfi.money_flow = MoneyFlow::Positive;
        s.cmf.flow_type = FlowType::Accumulation;
        s
    }

    #[test]
    fn volume_confirms_when_all_four_flows_agree() {
        let s = accumulating_snapshot();
        assert!(volume_confirms(&s, Bias::Bullish));
        assert!(!volume_confirms(&s, Bias::Bearish));
        assert!(!volume_confirms(&s, Bias::Neutral));
    }

    #[test]
    fn one_dissenting_flow_breaks_volume_confirmation() {
        let mut vwap_flat = accumulating_snapshot();
        vwap_flat.vwap.bias = Bias::Neutral;
        let mut obv_selling = accumulating_snapshot();
        obv_selling.obv.signal = ObvSignal::Sell;
        let mut mfi_balanced = accumulating_snapshot();
        mfi_balanced.mfi.money_flow = MoneyFlow::Balanced;
        let mut cmf_distributing = accumulating_snapshot();
        cmf_distributing.cmf.flow_type = FlowType::Distribution;

        for s in [vwap_flat, obv_selling, mfi_balanced, cmf_distributing] {
            assert!(!volume_confirms(&s, Bias::Bullish));
        }
    }

    #[test]
    fn bearish_volume_needs_mirrored_flows() {
        let mut s = quiet_snapshot();
        s.vwap.bias = Bias::Bearish;
        s.obv.signal = ObvSignal::Sell;
        s.mfi.money_flow = MoneyFlow::Negative;
        s.cmf.flow_type = FlowType::Distribution;
        assert!(volume_confirms(&s, Bias::Bearish));
        assert!(!volume_confirms(&s, Bias::Bullish));
    }

    #[test]
    fn opposite_zones_count_as_contradictions() {
        let mut s = quiet_snapshot();
        s.rsi.signal = ZoneSignal::Overbought;
        s.bollinger.signal = BollingerSignal::Overbought;
        assert_eq!(oscillator_agreement(&s, Bias::Bullish), (0, 2));
        assert_eq!(oscillator_agreement(&s, Bias::Bearish), (2, 0));
    }

    #[test]
    fn divergence_confirms_without_a_zone() {
        let mut s = quiet_snapshot();
        s.rsi.signal = ZoneSignal::Oversold;
        s.stochastic.signal = ZoneSignal::Oversold;
        s.williams_r.divergence = Divergence::BullishDivergence;
        assert_eq!(oscillator_agreement(&s, Bias::Bullish), (3, 0));

        // A divergence never contradicts, only a zone does.
        assert_eq!(oscillator_agreement(&s, Bias::Bearish), (0, 2));
    }

    #[test]
    fn squeeze_is_not_a_zone() {
        let mut s = quiet_snapshot();
        s.bollinger.signal = BollingerSignal::Squeeze;
        assert_eq!(oscillator_agreement(&s, Bias::Bullish), (0, 0));
        assert_eq!(oscillator_agreement(&quiet_snapshot(), Bias::Bearish), (0, 0));
    }

    #[test]
    fn agreeing_snapshot_lifts_confidence() {
        let mut s = accumulating_snapshot();
        s.rsi.signal = ZoneSignal::Oversold;
        s.stochastic.divergence = Divergence::BullishDivergence;
        s.williams_r.signal = ZoneSignal::Oversold;
        let scoring = WeightedScorer::default().score(contributions(&s));
        let direction = scoring.direction().unwrap();
        assert_eq!(direction, Bias::Bullish);

        let volume = volume_confirms(&s, direction);
        let (confirmations, contradictions) = oscillator_agreement(&s, direction);
        assert!(volume);
        assert_eq!((confirmations, contradictions), (3, 0));
        let base = confidence(scoring.normalized_score, false, 0, 0);
        assert!(confidence(scoring.normalized_score, volume, contradictions, confirmations) > base);
    }
}
