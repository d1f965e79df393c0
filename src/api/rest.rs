// =============================================================================
// REST API Endpoints - Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`:
//
//   GET  /api/v1/health                 liveness + server time
//   GET  /api/v1/indicators             registry names
//   POST /api/v1/analyze                composite analysis for one symbol
//   POST /api/v1/indicators/calculate   selected indicators for one symbol
//
// Indicator names are validated against the registry BEFORE any market data
// is fetched. Every success response carries a request id and an RFC 3339
// timestamp; errors use the `ApiError` body.
//
// CORS is configured permissively; the service holds no credentials.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::app_state::AppState;
use crate::error::IndicatorError;
use crate::indicators::{IndicatorParams, IndicatorSeries};
use crate::market_data::KlineInterval;
use crate::signals::{CompositeAnalysis, CompositeAnalyzer};
use crate::types::{OutputMode, PriceSeries, QueryMode};

const MAX_SYMBOL_LEN: usize = 20;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS, request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/indicators", get(list_indicators))
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/indicators/calculate", post(calculate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: i64,
    source: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server_time: Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        source: state.source.name().to_string(),
    })
}

// =============================================================================
// Indicator listing
// =============================================================================

#[derive(Serialize)]
struct IndicatorsResponse {
    count: usize,
    indicators: Vec<&'static str>,
}

async fn list_indicators(State(state): State<Arc<AppState>>) -> Json<IndicatorsResponse> {
    let indicators = state.registry.list_available();
    Json(IndicatorsResponse {
        count: indicators.len(),
        indicators,
    })
}

// =============================================================================
// Composite analysis
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    symbol: String,
    #[serde(default)]
    interval: Option<KlineInterval>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    output_mode: Option<OutputMode>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    request_id: Uuid,
    timestamp: String,
    symbol: String,
    interval: KlineInterval,
    analysis: CompositeAnalysis,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload?;
    let request_id = Uuid::new_v4();
    let symbol = normalize_symbol(&req.symbol)?;
    let interval = req.interval.unwrap_or(state.config.default_interval);
    let limit = resolve_limit(&state, req.limit)?;
    let output_mode = req.output_mode.unwrap_or_default();

    info!(%request_id, %symbol, %interval, limit, ?output_mode, "analyze requested");

    let series = fetch(&state, &symbol, interval, limit).await?;
    let analysis = CompositeAnalyzer::new(&state.registry).analyze(&series, &symbol, output_mode)?;

    info!(
        %request_id,
        %symbol,
        signal = %analysis.overall_signal,
        confidence = analysis.confidence,
        "analyze complete"
    );

    Ok(Json(AnalyzeResponse {
        request_id,
        timestamp: Utc::now().to_rfc3339(),
        symbol,
        interval,
        analysis,
    }))
}

// =============================================================================
// Indicator calculation
// =============================================================================

#[derive(Debug, Deserialize)]
struct CalculateRequest {
    symbol: String,
    #[serde(default)]
    interval: Option<KlineInterval>,
    #[serde(default)]
    limit: Option<usize>,
    indicators: Vec<String>,
    /// Overrides keyed by indicator name, e.g. `{"RSI": {"period": 21}}`.
    #[serde(default)]
    params: BTreeMap<String, IndicatorParams>,
    #[serde(default)]
    mode: Option<QueryMode>,
}

#[derive(Serialize)]
struct CalculateResponse {
    request_id: Uuid,
    timestamp: String,
    symbol: String,
    interval: KlineInterval,
    bars: usize,
    results: BTreeMap<String, IndicatorSeries>,
}

async fn calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(req) = payload?;
    let request_id = Uuid::new_v4();
    let symbol = normalize_symbol(&req.symbol)?;
    let interval = req.interval.unwrap_or(state.config.default_interval);
    let limit = resolve_limit(&state, req.limit)?;
    let mode = req.mode.unwrap_or_default();

    if req.indicators.is_empty() {
        return Err(ApiError::BadRequest(
            "indicators must name at least one indicator".to_string(),
        ));
    }
    for name in req.indicators.iter().chain(req.params.keys()) {
        if !state.registry.contains(name) {
            return Err(IndicatorError::UnknownIndicator(name.clone()).into());
        }
    }

    info!(
        %request_id,
        %symbol,
        %interval,
        limit,
        indicators = ?req.indicators,
        ?mode,
        "calculate requested"
    );

    let series = fetch(&state, &symbol, interval, limit).await?;
    let results = state
        .registry
        .calculate_many_with(&req.indicators, &series, &req.params, mode)?;

    Ok(Json(CalculateResponse {
        request_id,
        timestamp: Utc::now().to_rfc3339(),
        symbol,
        interval,
        bars: series.len(),
        results,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Upper-cased symbol, or 400 when it is empty, too long or not alphanumeric.
fn normalize_symbol(raw: &str) -> Result<String, ApiError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty()
        || symbol.len() > MAX_SYMBOL_LEN
        || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ApiError::BadRequest(format!("invalid symbol '{raw}'")));
    }
    Ok(symbol)
}

fn resolve_limit(state: &AppState, requested: Option<usize>) -> Result<usize, ApiError> {
    let limit = requested.unwrap_or(state.config.default_limit);
    if limit == 0 || limit > state.config.max_limit {
        return Err(ApiError::BadRequest(format!(
            "limit must be within 1..={}, got {limit}",
            state.config.max_limit
        )));
    }
    Ok(limit)
}

async fn fetch(
    state: &AppState,
    symbol: &str,
    interval: KlineInterval,
    limit: usize,
) -> Result<PriceSeries, ApiError> {
    state
        .source
        .fetch_series(symbol, interval, limit)
        .await
        .map_err(ApiError::Upstream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    #[test]
    fn symbols_are_upper_cased_and_checked() {
        assert_eq!(normalize_symbol(" btcusdt ").unwrap(), "BTCUSDT");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("BTC/USDT").is_err());
        assert!(normalize_symbol(&"A".repeat(21)).is_err());
    }

    struct NoSource;

    #[async_trait::async_trait]
    impl crate::market_data::KlineSource for NoSource {
        async fn fetch_series(
            &self,
            _symbol: &str,
            _interval: KlineInterval,
            _limit: usize,
        ) -> anyhow::Result<PriceSeries> {
            anyhow::bail!("offline")
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    #[test]
    fn limit_defaults_and_bounds() {
        let state = AppState::new(ServiceConfig::default(), Arc::new(NoSource));
        assert_eq!(resolve_limit(&state, None).unwrap(), 500);
        assert_eq!(resolve_limit(&state, Some(5000)).unwrap(), 5000);
        assert!(resolve_limit(&state, Some(0)).is_err());
        assert!(resolve_limit(&state, Some(5001)).is_err());
    }
}
