// =============================================================================
// Market Data - where price series come from
// =============================================================================
//
// The indicator core only ever sees a validated `PriceSeries`. Everything in
// this module is about getting one: interval codes, the source abstraction and
// the Binance REST implementation.

pub mod binance;
pub mod interval;

pub use binance::BinanceClient;
pub use interval::KlineInterval;

use anyhow::Result;

use crate::types::PriceSeries;

/// Provider of historical OHLCV series.
#[async_trait::async_trait]
pub trait KlineSource: Send + Sync {
    /// The newest `limit` bars for `symbol`, oldest first.
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: usize,
    ) -> Result<PriceSeries>;

    /// Source name for logs.
    fn name(&self) -> &str;
}
