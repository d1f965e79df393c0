// =============================================================================
// Application State - shared by every HTTP handler
// =============================================================================
//
// Read-only after construction: the registry and config never change while
// the service runs, and the kline source manages its own connection pool.
// Handlers receive it as `Arc<AppState>`.
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::ServiceConfig;
use crate::market_data::{BinanceClient, KlineSource};
use crate::registry::IndicatorRegistry;

pub struct AppState {
    pub config: ServiceConfig,
    pub registry: IndicatorRegistry,
    pub source: Arc<dyn KlineSource>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State around an arbitrary kline source.
    pub fn new(config: ServiceConfig, source: Arc<dyn KlineSource>) -> Self {
        Self {
            config,
            registry: IndicatorRegistry::new(),
            source,
            started_at: Utc::now(),
        }
    }

    /// State backed by the Binance REST client described by `config`.
    pub fn with_binance(config: ServiceConfig) -> Result<Self> {
        let client = BinanceClient::new(
            config.binance_base_url.clone(),
            config.request_timeout(),
            config.page_delay(),
        )?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Seconds since the state was built.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
