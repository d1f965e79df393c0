// =============================================================================
// Signals Module
// =============================================================================
//
// Turns indicator readings into one verdict:
// - Weighted scoring (fixed weights, clamped votes, verdict thresholds)
// - Composite analysis over the standard indicator battery

pub mod composite;
pub mod weighted_score;

pub use composite::{CompositeAnalysis, CompositeAnalyzer, MIN_ANALYSIS_BARS};
pub use weighted_score::{OverallSignal, ScoringResult, SignalContribution, WeightedScorer};
