//! HTTP request handlers

use super::types::{
    ErrorResponse, HealthResponse, ResetRequest, ResetResponse, RATE_LIMIT_MESSAGE,
};
use super::AppState;
use crate::mediator::MediatorError;
use crate::rate_limit::{CallerKey, RateLimited};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::time::Duration;

/// Create the API router
///
/// Routes under `/api/` need the peer address, so serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_request_bytes);
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(api_health))
        .route("/api/generate-reset", post(generate_reset))
        .layer(body_limit)
        .with_state(state)
}

// ============================================================
// Health
// ============================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Health under `/api/` shares the caller's rate window
async fn api_health(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<Json<HealthResponse>, AppError> {
    state
        .mediator
        .limiter()
        .admit(CallerKey::from(peer))
        .await?;
    Ok(health().await)
}

// ============================================================
// Reset Generation
// ============================================================

async fn generate_reset(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let text = request.text.unwrap_or_default();

    let outcome = state
        .mediator
        .generate_reset(CallerKey::from(peer), &text)
        .await?;

    let status = if outcome.is_degraded() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ResetResponse {
            reset: outcome.reset,
        }),
    )
        .into_response())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    TooManyRequests { retry_after: Duration },
    /// Body rejected before parsing, e.g. over the size limit
    Rejected { status: StatusCode, message: String },
}

impl From<MediatorError> for AppError {
    fn from(err: MediatorError) -> Self {
        match err {
            MediatorError::Validation => AppError::BadRequest(err.to_string()),
            MediatorError::RateLimited(limited) => limited.into(),
        }
    }
}

impl From<RateLimited> for AppError {
    fn from(limited: RateLimited) -> Self {
        AppError::TooManyRequests {
            retry_after: limited.retry_after,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "Rejected reset request body"
        );
        match rejection {
            // Without a JSON body there is no text to reflect on
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest(MediatorError::Validation.to_string())
            }
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                AppError::BadRequest(rejection.body_text())
            }
            other => AppError::Rejected {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
            }
            AppError::TooManyRequests { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, HeaderValue::from(retry_after.as_secs()))],
                Json(ErrorResponse::new(RATE_LIMIT_MESSAGE)),
            )
                .into_response(),
            AppError::Rejected { status, message } => {
                (status, Json(ErrorResponse::new(message))).into_response()
            }
        }
    }
}
