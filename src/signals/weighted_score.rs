// =============================================================================
// Weighted Scorer - fixed-weight signal aggregation
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Bias;

/// One indicator's directional vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    /// Maximum absolute number of points this indicator may contribute.
    pub weight: f64,
    /// Signed points awarded, always within `[-weight, weight]`.
    pub points: f64,
    pub reason: String,
}

impl SignalContribution {
    /// Points are clamped into `[-weight, weight]`.
    pub fn new(name: impl Into<String>, weight: f64, points: f64, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            points: points.clamp(-weight, weight),
            reason: reason.into(),
        }
    }
}

/// Verdict derived from the normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallSignal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl std::fmt::Display for OverallSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG_BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// Result of the weighted scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub score: f64,
    pub max_score: f64,
    /// `score / max_score`, within `[-1, 1]`.
    pub normalized_score: f64,
    pub overall_signal: OverallSignal,
    pub contributions: Vec<SignalContribution>,
}

impl ScoringResult {
    /// Sign of the score; `None` when the votes cancel out exactly.
    pub fn direction(&self) -> Option<Bias> {
        match Bias::from_sign(self.score) {
            Bias::Neutral => None,
            bias => Some(bias),
        }
    }
}

/// Sums contributions and maps the normalized score onto a verdict.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    /// `|normalized| >= strong_threshold` => STRONG_BUY / STRONG_SELL.
    pub strong_threshold: f64,
    /// `|normalized| >= entry_threshold` => BUY / SELL.
    pub entry_threshold: f64,
}

impl WeightedScorer {
    pub fn new(strong_threshold: f64, entry_threshold: f64) -> Self {
        Self {
            strong_threshold,
            entry_threshold,
        }
    }

    pub fn classify(&self, normalized_score: f64) -> OverallSignal {
        if normalized_score >= self.strong_threshold {
            OverallSignal::StrongBuy
        } else if normalized_score >= self.entry_threshold {
            OverallSignal::Buy
        } else if normalized_score <= -self.strong_threshold {
            OverallSignal::StrongSell
        } else if normalized_score <= -self.entry_threshold {
            OverallSignal::Sell
        } else {
            OverallSignal::Neutral
        }
    }

    /// Score a set of contributions. The maximum score is the sum of weights.
    pub fn score(&self, contributions: Vec<SignalContribution>) -> ScoringResult {
        let score: f64 = contributions.iter().map(|c| c.points).sum();
        let max_score: f64 = contributions.iter().map(|c| c.weight).sum();
        let normalized_score = if max_score > 0.0 {
            (score / max_score).clamp(-1.0, 1.0)
        } else {
            0.0
        };

        ScoringResult {
            score,
            max_score,
            normalized_score,
            overall_signal: self.classify(normalized_score),
            contributions,
        }
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(0.6, 0.2)
    }
}
