// =============================================================================
// Indicator Registry
// =============================================================================
//
// Name -> constructor table. Built once per owner (the service builds one at
// startup and shares it read-only); nothing here is global or mutable after
// construction.
//
// Names are matched case-insensitively. Every canonical name may also be
// reached through a handful of common aliases (BB, STOCH, WILLR, ...).

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::IndicatorError;
use crate::indicators::adx::Adx;
use crate::indicators::atr::Atr;
use crate::indicators::awesome_oscillator::AwesomeOscillator;
use crate::indicators::bollinger::BollingerBands;
use crate::indicators::cmf::Cmf;
use crate::indicators::force_index::ForceIndex;
use crate::indicators::ichimoku::Ichimoku;
use crate::indicators::keltner::KeltnerChannel;
use crate::indicators::macd::Macd;
use crate::indicators::mfi::Mfi;
use crate::indicators::moving_average::MovingAverage;
use crate::indicators::obv::Obv;
use crate::indicators::parabolic_sar::ParabolicSar;
use crate::indicators::rsi::Rsi;
use crate::indicators::stochastic::Stochastic;
use crate::indicators::stochastic_rsi::StochasticRsi;
use crate::indicators::vwap::Vwap;
use crate::indicators::williams_r::WilliamsR;
use crate::indicators::{Calculator, IndicatorParams, IndicatorSeries};
use crate::types::{PriceSeries, QueryMode};

/// Builds a calculator from (possibly empty) parameter overrides.
pub type Constructor = fn(&IndicatorParams) -> Result<Calculator, IndicatorError>;

const ALIASES: &[(&str, &str)] = &[
    ("BB", "BOLLINGER"),
    ("BOLLINGER_BANDS", "BOLLINGER"),
    ("STOCH", "STOCHASTIC"),
    ("WILLR", "WILLIAMS_R"),
    ("WILLIAMSR", "WILLIAMS_R"),
    ("PARABOLIC_SAR", "PSAR"),
    ("STOCHRSI", "STOCH_RSI"),
    ("AWESOME_OSCILLATOR", "AO"),
    ("FI", "FORCE_INDEX"),
    ("KELTNER_CHANNEL", "KELTNER"),
];

pub struct IndicatorRegistry {
    /// Canonical names in registration order.
    names: Vec<&'static str>,
    constructors: BTreeMap<&'static str, Constructor>,
    aliases: BTreeMap<&'static str, &'static str>,
}

impl IndicatorRegistry {
    fn empty() -> Self {
        Self {
            names: Vec::new(),
            constructors: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Creates a registry with every built-in calculator registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register("RSI", |p| Rsi::from_params(p).map(Calculator::from));
        registry.register("MACD", |p| Macd::from_params(p).map(Calculator::from));
        registry.register("MA", |p| MovingAverage::from_params(p, 20).map(Calculator::from));
        registry.register("MA20", |p| MovingAverage::from_params(p, 20).map(Calculator::from));
        registry.register("MA50", |p| MovingAverage::from_params(p, 50).map(Calculator::from));
        registry.register("MA200", |p| MovingAverage::from_params(p, 200).map(Calculator::from));
        registry.register("BOLLINGER", |p| {
            BollingerBands::from_params(p).map(Calculator::from)
        });
        registry.register("STOCHASTIC", |p| Stochastic::from_params(p).map(Calculator::from));
        registry.register("WILLIAMS_R", |p| WilliamsR::from_params(p).map(Calculator::from));
        registry.register("OBV", |_| Ok(Calculator::from(Obv)));
        registry.register("MFI", |p| Mfi::from_params(p).map(Calculator::from));
        registry.register("CMF", |p| Cmf::from_params(p).map(Calculator::from));
        registry.register("VWAP", |_| Ok(Calculator::from(Vwap)));
        registry.register("ATR", |p| Atr::from_params(p).map(Calculator::from));
        registry.register("ADX", |p| Adx::from_params(p).map(Calculator::from));
        registry.register("ICHIMOKU", |p| Ichimoku::from_params(p).map(Calculator::from));
        registry.register("PSAR", |p| ParabolicSar::from_params(p).map(Calculator::from));
        registry.register("STOCH_RSI", |p| {
            StochasticRsi::from_params(p).map(Calculator::from)
        });
        registry.register("AO", |p| {
            AwesomeOscillator::from_params(p).map(Calculator::from)
        });
        registry.register("FORCE_INDEX", |p| ForceIndex::from_params(p).map(Calculator::from));
        registry.register("KELTNER", |p| {
            KeltnerChannel::from_params(p).map(Calculator::from)
        });

        for &(alias, target) in ALIASES {
            registry.aliases.insert(alias, target);
        }
        registry
    }

    /// Registers (or replaces) a calculator under an upper-case canonical name.
    pub fn register(&mut self, name: &'static str, constructor: Constructor) {
        if self.constructors.insert(name, constructor).is_none() {
            self.names.push(name);
        }
    }

    /// Canonical name for `name` (any case, alias or canonical), if known.
    pub fn canonical_name(&self, name: &str) -> Option<&'static str> {
        let upper = name.trim().to_ascii_uppercase();
        if let Some((&canonical, _)) = self.constructors.get_key_value(upper.as_str()) {
            return Some(canonical);
        }
        self.aliases.get(upper.as_str()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Canonical names in registration order.
    pub fn list_available(&self) -> Vec<&'static str> {
        self.names.clone()
    }

    /// Construct one calculator.
    ///
    /// # Errors
    /// - `UnknownIndicator` for an unrecognised name
    /// - `InvalidParams` when an override is out of range
    pub fn create(
        &self,
        name: &str,
        params: Option<&IndicatorParams>,
    ) -> Result<Calculator, IndicatorError> {
        let canonical = self
            .canonical_name(name)
            .ok_or_else(|| IndicatorError::UnknownIndicator(name.to_string()))?;
        let constructor = self
            .constructors
            .get(canonical)
            .ok_or_else(|| IndicatorError::UnknownIndicator(name.to_string()))?;

        let defaults = IndicatorParams::default();
        let calculator = constructor(params.unwrap_or(&defaults))?;
        debug!(requested = name, indicator = canonical, "calculator created");
        Ok(calculator)
    }

    /// Construct several calculators with default parameters. Fails on the
    /// first unknown name.
    pub fn create_many<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Calculator>, IndicatorError> {
        names
            .iter()
            .map(|name| self.create(name.as_ref(), None))
            .collect()
    }

    /// Run one indicator over `series` and select the requested part.
    pub fn calculate(
        &self,
        name: &str,
        series: &PriceSeries,
        params: Option<&IndicatorParams>,
        mode: QueryMode,
    ) -> Result<IndicatorSeries, IndicatorError> {
        let calculator = self.create(name, params)?;
        let result = calculator.calculate(series)?;
        debug!(
            indicator = calculator.name(),
            bars = series.len(),
            results = result.len(),
            ?mode,
            "indicator calculated"
        );
        Ok(result.select(mode))
    }

    /// Run several indicators with default parameters, keyed by canonical name.
    pub fn calculate_many<S: AsRef<str>>(
        &self,
        names: &[S],
        series: &PriceSeries,
        mode: QueryMode,
    ) -> Result<BTreeMap<String, IndicatorSeries>, IndicatorError> {
        self.calculate_many_with(names, series, &BTreeMap::new(), mode)
    }

    /// Like [`IndicatorRegistry::calculate_many`], with per-indicator
    /// overrides looked up by canonical name.
    ///
    /// Every name is resolved before anything is computed, so an unknown name
    /// fails the whole call without partial work.
    pub fn calculate_many_with<S: AsRef<str>>(
        &self,
        names: &[S],
        series: &PriceSeries,
        overrides: &BTreeMap<String, IndicatorParams>,
        mode: QueryMode,
    ) -> Result<BTreeMap<String, IndicatorSeries>, IndicatorError> {
        let resolved = names
            .iter()
            .map(|name| {
                self.canonical_name(name.as_ref())
                    .ok_or_else(|| IndicatorError::UnknownIndicator(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = BTreeMap::new();
        for canonical in resolved {
            let params = self.lookup_params(overrides, canonical);
            let result = self.calculate(canonical, series, params, mode)?;
            out.insert(canonical.to_string(), result);
        }
        Ok(out)
    }

    /// Override keys are matched through the same case/alias rules as names.
    fn lookup_params<'a>(
        &self,
        overrides: &'a BTreeMap<String, IndicatorParams>,
        canonical: &str,
    ) -> Option<&'a IndicatorParams> {
        overrides
            .iter()
            .find(|(key, _)| self.canonical_name(key) == Some(canonical))
            .map(|(_, params)| params)
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rsi::RsiResult;
    use crate::indicators::test_support::*;
    use crate::indicators::ResultSeries;

    #[test]
    fn unknown_name_is_rejected() {
        let registry = IndicatorRegistry::new();
        assert_eq!(
            registry.create("FOO", None).unwrap_err(),
            IndicatorError::UnknownIndicator("FOO".to_string())
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        let registry = IndicatorRegistry::new();
        assert_eq!(registry.create("rsi", None).unwrap().name(), "RSI");
        assert_eq!(registry.create(" Macd ", None).unwrap().name(), "MACD");
    }

    #[test]
    fn aliases_resolve_to_canonical() {
        let registry = IndicatorRegistry::new();
        assert_eq!(registry.canonical_name("bb"), Some("BOLLINGER"));
        assert_eq!(registry.canonical_name("WillR"), Some("WILLIAMS_R"));
        assert_eq!(registry.canonical_name("stochrsi"), Some("STOCH_RSI"));
        assert_eq!(registry.canonical_name("nope"), None);
    }

    #[test]
    fn list_available_is_stable() {
        let names = IndicatorRegistry::new().list_available();
        assert_eq!(names.len(), 21);
        assert_eq!(&names[..6], &["RSI", "MACD", "MA", "MA20", "MA50", "MA200"]);
        assert_eq!(names.last(), Some(&"KELTNER"));
    }

    #[test]
    fn moving_average_names_carry_their_period() {
        let registry = IndicatorRegistry::new();
        for (name, period) in [("MA", 20), ("MA20", 20), ("MA50", 50), ("MA200", 200)] {
            let calc = registry.create(name, None).unwrap();
            assert_eq!(calc, Calculator::from(MovingAverage::new(period)));
        }
    }

    #[test]
    fn oversized_periods_are_rejected_before_computing() {
        let registry = IndicatorRegistry::new();
        let series = wave(50);
        for (name, key, value) in [
            ("RSI", "period", 1e20),
            ("ADX", "period", 1e19),
            ("MACD", "signal", 1e20),
            ("STOCHASTIC", "d_period", 1e20),
        ] {
            let params = IndicatorParams::new().with(key, value);
            assert!(
                matches!(
                    registry.calculate(name, &series, Some(&params), QueryMode::Latest),
                    Err(IndicatorError::InvalidParams(_))
                ),
                "{name} accepted {key} = {value}"
            );
        }
    }

    #[test]
    fn params_override_defaults() {
        let registry = IndicatorRegistry::new();
        let params = IndicatorParams::new().with("period", 7.0);
        let calc = registry.create("RSI", Some(&params)).unwrap();
        assert_eq!(calc.warmup(), 7);

        let bad = IndicatorParams::new().with("period", 0.0);
        assert!(matches!(
            registry.create("RSI", Some(&bad)),
            Err(IndicatorError::InvalidParams(_))
        ));
    }

    #[test]
    fn create_many_fails_on_first_unknown() {
        let registry = IndicatorRegistry::new();
        assert_eq!(registry.create_many(&["RSI", "OBV"]).unwrap().len(), 2);
        assert_eq!(
            registry.create_many(&["RSI", "FOO", "BAR"]).unwrap_err(),
            IndicatorError::UnknownIndicator("FOO".to_string())
        );
    }

    #[test]
    fn calculate_selects_mode() {
        let registry = IndicatorRegistry::new();
        let series = rising(40, 100.0, 1.0);

        let full = registry.calculate("RSI", &series, None, QueryMode::Full).unwrap();
        assert_eq!(full.len(), 26);
        assert_eq!(full.offset(), 14);

        let latest = registry.calculate("RSI", &series, None, QueryMode::Latest).unwrap();
        let latest = ResultSeries::<RsiResult>::try_from(latest).unwrap();
        let full = ResultSeries::<RsiResult>::try_from(full).unwrap();
        assert_eq!(latest.offset, 39);
        assert_eq!(latest.latest(), full.latest());
    }

    #[test]
    fn calculate_many_keys_by_canonical_name() {
        let registry = IndicatorRegistry::new();
        let series = wave(80);
        let out = registry
            .calculate_many(&["bb", "rsi", "OBV"], &series, QueryMode::Latest)
            .unwrap();
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["BOLLINGER", "OBV", "RSI"]);
        assert!(out.values().all(|s| s.len() == 1));
    }

    #[test]
    fn calculate_many_checks_names_before_computing() {
        let registry = IndicatorRegistry::new();
        // too short for anything: an unknown name must still win
        let series = rising(2, 100.0, 1.0);
        assert_eq!(
            registry
                .calculate_many(&["RSI", "FOO"], &series, QueryMode::Latest)
                .unwrap_err(),
            IndicatorError::UnknownIndicator("FOO".to_string())
        );
    }

    #[test]
    fn per_indicator_overrides_apply() {
        let registry = IndicatorRegistry::new();
        let mut overrides = BTreeMap::new();
        overrides.insert("rsi".to_string(), IndicatorParams::new().with("period", 5.0));
        let out = registry
            .calculate_many_with(&["RSI"], &rising(20, 100.0, 1.0), &overrides, QueryMode::Full)
            .unwrap();
        assert_eq!(out["RSI"].offset(), 5);
    }
}
