// =============================================================================
// Binance REST Client - public kline history
// =============================================================================
//
// Only the unsigned `/api/v3/klines` endpoint is used. Binance caps a single
// request at 1000 bars, so longer histories are assembled by paging backwards
// with `endTime = oldest open_time - 1` until enough bars have arrived or the
// exchange runs out of history.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use super::{KlineInterval, KlineSource};
use crate::types::{PriceBar, PriceSeries};

/// Provider-side maximum bars per request.
pub const MAX_KLINES_PER_REQUEST: usize = 1000;

/// Binance public market-data client.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    page_delay: Duration,
}

impl BinanceClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// # Arguments
    /// * `base_url`   - e.g. `https://api.binance.com` (no trailing slash needed)
    /// * `timeout`    - per-request timeout
    /// * `page_delay` - pause between consecutive pages of one history fetch
    pub fn new(base_url: impl Into<String>, timeout: Duration, page_delay: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(%base_url, "BinanceClient initialised");

        Ok(Self {
            base_url,
            client,
            page_delay,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Klines
    // -------------------------------------------------------------------------

    /// GET /api/v3/klines - one page of at most 1000 bars.
    ///
    /// Array indices of each row:
    ///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume, ...
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: usize,
        end_time: Option<i64>,
    ) -> Result<Vec<PriceBar>> {
        let limit = limit.clamp(1, MAX_KLINES_PER_REQUEST);
        let mut url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );
        if let Some(end) = end_time {
            url.push_str(&format!("&endTime={end}"));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /api/v3/klines request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Binance GET /api/v3/klines returned {}: {}", status, body);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse klines response")?;

        let raw = body.as_array().context("klines response is not an array")?;
        let bars = raw
            .iter()
            .enumerate()
            .map(|(i, row)| Self::parse_kline(row).with_context(|| format!("kline row {i}")))
            .collect::<Result<Vec<_>>>()?;

        debug!(symbol, %interval, count = bars.len(), "klines page fetched");
        Ok(bars)
    }

    /// The newest `limit` bars, paging backwards as needed.
    #[instrument(skip(self), name = "binance::get_history")]
    pub async fn get_history(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: usize,
    ) -> Result<Vec<PriceBar>> {
        let mut bars: Vec<PriceBar> = Vec::with_capacity(limit);
        let mut end_time = None;
        let mut pages = 0usize;

        while bars.len() < limit {
            if pages > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let wanted = (limit - bars.len()).min(MAX_KLINES_PER_REQUEST);
            let page = self.get_klines(symbol, interval, wanted, end_time).await?;
            pages += 1;

            let received = page.len();
            let oldest = page.iter().filter_map(|bar| bar.open_time).min();
            bars.extend(page);

            // A short page means the exchange has no older history.
            if received < wanted {
                break;
            }
            match oldest {
                Some(open_time) => end_time = Some(open_time - 1),
                None => break,
            }
        }

        bars.sort_by_key(|bar| bar.open_time);
        bars.dedup_by_key(|bar| bar.open_time);
        if bars.len() > limit {
            let excess = bars.len() - limit;
            bars.drain(..excess);
        }

        let gaps = Self::count_gaps(&bars, interval);
        if gaps > 0 {
            warn!(symbol, %interval, gaps, "kline history has missing bars");
        }

        debug!(symbol, %interval, pages, count = bars.len(), "kline history assembled");
        Ok(bars)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Consecutive bars further apart than two nominal intervals.
    fn count_gaps(bars: &[PriceBar], interval: KlineInterval) -> usize {
        let max_step = interval.to_millis() * 2;
        bars.windows(2)
            .filter(|w| match (w[0].open_time, w[1].open_time) {
                (Some(a), Some(b)) => b - a > max_step,
                _ => false,
            })
            .count()
    }

    fn parse_kline(row: &serde_json::Value) -> Result<PriceBar> {
        let fields = row.as_array().context("kline entry is not an array")?;
        if fields.len() < 6 {
            anyhow::bail!("kline entry has {} fields, expected at least 6", fields.len());
        }

        let open_time = fields[0].as_i64().context("kline openTime is not an integer")?;
        Ok(PriceBar::new(
            Self::parse_str_f64(&fields[1])?,
            Self::parse_str_f64(&fields[2])?,
            Self::parse_str_f64(&fields[3])?,
            Self::parse_str_f64(&fields[4])?,
            Self::parse_str_f64(&fields[5])?,
        )
        .with_open_time(open_time))
    }

    /// Parse a JSON value that may be either a string or a number into `f64`.
    fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
        if let Some(s) = val.as_str() {
            s.parse::<f64>()
                .with_context(|| format!("failed to parse '{s}' as f64"))
        } else if let Some(n) = val.as_f64() {
            Ok(n)
        } else {
            anyhow::bail!("expected string or number, got: {val}")
        }
    }
}

#[async_trait::async_trait]
impl KlineSource for BinanceClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: usize,
    ) -> Result<PriceSeries> {
        let bars = self.get_history(symbol, interval, limit).await?;
        if bars.is_empty() {
            anyhow::bail!("no kline data returned for {symbol} {interval}");
        }
        PriceSeries::new(bars).with_context(|| format!("invalid kline data for {symbol}"))
    }

    fn name(&self) -> &str {
        "binance"
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("page_delay", &self.page_delay)
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MINUTE_MS: i64 = 60_000;

    fn rows(range: std::ops::Range<i64>) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = range
            .map(|t| {
                let close = 100.0 + t as f64 * 0.01;
                json!([
                    t * MINUTE_MS,
                    format!("{close:.2}"),
                    format!("{:.2}", close + 1.0),
                    format!("{:.2}", close - 1.0),
                    format!("{close:.2}"),
                    "12.5",
                    t * MINUTE_MS + MINUTE_MS - 1,
                    "1250.0",
                    42,
                    "6.0",
                    "600.0",
                    "0"
                ])
            })
            .collect();
        serde_json::Value::Array(rows)
    }

    fn client(server: &MockServer) -> BinanceClient {
        BinanceClient::new(server.uri(), Duration::from_secs(5), Duration::ZERO).unwrap()
    }

    #[tokio::test]
    async fn single_page_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("interval", "1d"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows(10..13)))
            .mount(&server)
            .await;

        let series = client(&server)
            .fetch_series("BTCUSDT", KlineInterval::Day1, 3)
            .await
            .unwrap();
        assert_eq!(series.len(), 3);
        let first = series.bars()[0];
        assert_eq!(first.open_time, Some(10 * MINUTE_MS));
        assert!((first.close - 100.10).abs() < 1e-9);
        assert_eq!(first.volume, 12.5);
    }

    #[tokio::test]
    async fn long_history_pages_backwards() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .and(query_param("limit", "1000"))
            .and(query_param_is_missing("endTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows(1000..2000)))
            .expect(1)
            .mount(&server)
            .await;
        let end_time = (1000 * MINUTE_MS - 1).to_string();
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .and(query_param("limit", "500"))
            .and(query_param("endTime", end_time.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows(500..1000)))
            .expect(1)
            .mount(&server)
            .await;

        let bars = client(&server)
            .get_history("ETHUSDT", KlineInterval::Minute30, 1500)
            .await
            .unwrap();
        assert_eq!(bars.len(), 1500);
        assert_eq!(bars[0].open_time, Some(500 * MINUTE_MS));
        assert_eq!(bars[1499].open_time, Some(1999 * MINUTE_MS));
        assert!(bars.windows(2).all(|w| w[0].open_time < w[1].open_time));
    }

    #[tokio::test]
    async fn short_history_stops_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows(0..250)))
            .expect(1)
            .mount(&server)
            .await;

        let bars = client(&server)
            .get_history("NEWCOIN", KlineInterval::Day1, 300)
            .await
            .unwrap();
        assert_eq!(bars.len(), 250);
    }

    #[tokio::test]
    async fn exchange_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_series("NOPE", KlineInterval::Day1, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn non_json_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_series("BTCUSDT", KlineInterval::Day1, 10)
            .await
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("502"));
        assert!(message.contains("Bad Gateway"));
    }

    #[test]
    fn gaps_are_counted_against_the_interval() {
        let bar = |minute: i64| PriceBar::new(1.0, 1.0, 1.0, 1.0, 0.0).with_open_time(minute * MINUTE_MS);
        let bars = [bar(0), bar(30), bar(60), bar(150), bar(180)];
        assert_eq!(BinanceClient::count_gaps(&bars, KlineInterval::Minute30), 1);
        assert_eq!(BinanceClient::count_gaps(&bars, KlineInterval::Hour1), 0);
        assert_eq!(BinanceClient::count_gaps(&bars[..3], KlineInterval::Minute30), 0);
    }

    #[tokio::test]
    async fn malformed_row_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[1, "1.0", "2.0", "x", "1.5", "3"]])),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_series("BTCUSDT", KlineInterval::Day1, 1)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("kline row 0"));
    }
}
