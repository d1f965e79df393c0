// =============================================================================
// Nexus TA - technical-analysis indicator engine
// =============================================================================
//
// Core (pure, synchronous):
//   types, error, indicators, registry, signals
//
// Service plumbing (async):
//   market_data, config, app_state, api
// =============================================================================

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod registry;
pub mod signals;
pub mod types;

pub use error::IndicatorError;
pub use indicators::{Calculator, Indicator, IndicatorParams, IndicatorSeries, ResultSeries};
pub use registry::IndicatorRegistry;
pub use signals::{CompositeAnalysis, CompositeAnalyzer, OverallSignal};
pub use types::{OutputMode, PriceBar, PriceSeries, QueryMode};
