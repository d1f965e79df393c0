// =============================================================================
// Service Configuration - JSON file plus environment overrides
// =============================================================================
//
// Every field carries a serde default so that a partial (or empty) config
// file is always valid. Environment variables win over the file:
//
//   NEXUS_CONFIG            path of the JSON file (default nexus_config.json)
//   NEXUS_BIND_ADDR         listen address
//   NEXUS_BINANCE_BASE_URL  market-data endpoint
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::market_data::KlineInterval;

pub const DEFAULT_CONFIG_PATH: &str = "nexus_config.json";
pub const CONFIG_PATH_ENV: &str = "NEXUS_CONFIG";
pub const BIND_ADDR_ENV: &str = "NEXUS_BIND_ADDR";
pub const BINANCE_BASE_URL_ENV: &str = "NEXUS_BINANCE_BASE_URL";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_binance_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_interval() -> KlineInterval {
    KlineInterval::Day1
}

fn default_limit() -> usize {
    500
}

fn default_max_limit() -> usize {
    5000
}

fn default_page_delay_ms() -> u64 {
    100
}

// =============================================================================
// ServiceConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_binance_base_url")]
    pub binance_base_url: String,

    /// Per-request timeout towards the exchange.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Interval used when a request does not name one.
    #[serde(default = "default_interval")]
    pub default_interval: KlineInterval,

    /// Bars fetched when a request does not name a limit.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound on a requested limit (several exchange pages).
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Pause between consecutive kline pages.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            binance_base_url: default_binance_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_interval: default_interval(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

impl ServiceConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;
        config.validate()?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            default_interval = %config.default_interval,
            "service config loaded"
        );

        Ok(config)
    }

    /// Resolve the config for the running process: file named by
    /// `NEXUS_CONFIG` (or the default path), falling back to defaults with a
    /// warning, then environment overrides.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path, error = %format!("{e:#}"), "using default service config");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment-style overrides from `lookup`. Empty values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            info!(bind_addr = %addr, "bind address overridden from environment");
            self.bind_addr = addr;
        }
        if let Some(url) = lookup(BINANCE_BASE_URL_ENV) {
            info!(binance_base_url = %url, "Binance base URL overridden from environment");
            self.binance_base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            anyhow::bail!("max_limit must be positive");
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            anyhow::bail!(
                "default_limit {} must be within 1..={}",
                self.default_limit,
                self.max_limit
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}
