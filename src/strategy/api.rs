// Strategy HTTP API implementation
// This file provides HTTP endpoints to trigger a strategy run and read the
// per-strategy execution times
//
// Numan Thabit 2025 Nov

use super::{Strategy, StrategyExecutor};
use crate::errors::SwapError;
use crate::state::{BoardSnapshot, ExecutionBoard};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct ApiState {
    pub executor: Arc<StrategyExecutor>,
    pub board: ExecutionBoard,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub strategy: Strategy,
    pub digest: String,
    pub execution_time: String,
    pub elapsed_ms: u128,
    pub gas_budget: Option<u64>,
    pub tip_amount: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the HTTP router with API endpoints
pub fn create_api_router(state: ApiState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/v1/execute/:strategy", post(execute_strategy))
        .route("/api/v1/times", get(execution_times))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn metrics() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(),
    )
        .into_response()
}

fn status_for(err: &SwapError) -> StatusCode {
    match err {
        SwapError::WalletDisconnected => StatusCode::CONFLICT,
        SwapError::SigningRejected(_) => StatusCode::FORBIDDEN,
        SwapError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SwapError::RouteResolution(_)
        | SwapError::FeeEstimation(_)
        | SwapError::Submission(_)
        | SwapError::Confirmation(_)
        | SwapError::Transport(_)
        | SwapError::Provider(_) => StatusCode::BAD_GATEWAY,
    }
}

fn error_body(status: StatusCode, error: String, kind: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            kind: kind.to_string(),
        }),
    )
}

/// Run one strategy and report its measured window
async fn execute_strategy(
    State(state): State<ApiState>,
    Path(raw): Path<String>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let strategy: Strategy = raw
        .parse()
        .map_err(|e: super::UnknownStrategy| {
            error_body(StatusCode::BAD_REQUEST, e.to_string(), "unknown_strategy")
        })?;

    let report = state
        .board
        .run(&state.executor, strategy)
        .await
        .map_err(|e| error_body(status_for(&e), e.to_string(), e.kind()))?;

    Ok(Json(ExecuteResponse {
        strategy: report.strategy,
        digest: report.digest,
        execution_time: report.execution_time,
        elapsed_ms: report.elapsed.as_millis(),
        gas_budget: report.fee.map(|f| f.gas_budget),
        tip_amount: report.fee.map(|f| f.tip_amount),
    }))
}

/// Latest execution time per strategy
async fn execution_times(State(state): State<ApiState>) -> Json<BoardSnapshot> {
    Json(state.board.snapshot().await)
}
