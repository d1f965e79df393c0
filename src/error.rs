// =============================================================================
// Core error types
// =============================================================================
//
// Every failure the indicator engine can raise. Degenerate numeric inputs
// (zero range, zero average loss, zero volume) are NOT errors; each calculator
// documents the fallback constant it uses instead.

use thiserror::Error;

/// Errors raised synchronously by calculators, the registry and the composite
/// analyzer. None of them are retried inside the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// The series is shorter than the calculator's warm-up requirement.
    #[error("insufficient data for {indicator}: need {required} bars, got {actual}")]
    InsufficientData {
        /// Indicator (or analysis) that rejected the series.
        indicator: String,
        /// Minimum number of bars required.
        required: usize,
        /// Number of bars supplied.
        actual: usize,
    },

    /// Registry lookup failed.
    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    /// A parameter override is out of range or malformed.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// A bar violates the OHLCV invariants.
    #[error("invalid price data: {0}")]
    InvalidPriceData(String),
}

impl IndicatorError {
    #[must_use]
    pub fn insufficient(indicator: impl Into<String>, required: usize, actual: usize) -> Self {
        IndicatorError::InsufficientData {
            indicator: indicator.into(),
            required,
            actual,
        }
    }

    #[must_use]
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        IndicatorError::InvalidParams(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_indicator() {
        let err = IndicatorError::insufficient("RSI", 15, 10);
        assert_eq!(
            err.to_string(),
            "insufficient data for RSI: need 15 bars, got 10"
        );
    }

    #[test]
    fn unknown_indicator_message() {
        let err = IndicatorError::UnknownIndicator("FOO".into());
        assert_eq!(err.to_string(), "unknown indicator: FOO");
    }
}
