// =============================================================================
// API errors - one JSON shape for every failure
// =============================================================================
//
//   {"error": "<message>", "is_error": true}
//
//   request validation, unknown indicator, bad params   -> 400
//   series too short for the requested computation      -> 422
//   market-data fetch failed                            -> 502
// =============================================================================

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::error::IndicatorError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Indicator(IndicatorError),
    Upstream(anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    is_error: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Indicator(IndicatorError::InsufficientData { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Indicator(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Indicator(e) => e.to_string(),
            ApiError::Upstream(e) => format!("market data unavailable: {e:#}"),
        }
    }
}

impl From<IndicatorError> for ApiError {
    fn from(e: IndicatorError) -> Self {
        ApiError::Indicator(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();
        warn!(status = %status, error = %error, "request failed");
        (
            status,
            Json(ErrorBody {
                error,
                is_error: true,
            }),
        )
            .into_response()
    }
}
