//! REST API handlers for the backtest service

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::service::{BacktestService, ServiceError};
use crate::config::SimulationParams;
use crate::error::BacktestError;
use crate::pipeline::BacktestReport;
use crate::schema::ColumnNames;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_columns: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct DefaultsResponse {
    pub sim_threshold_pct: f64,
    pub min_combo_orders: u32,
    pub max_avg_delta: f64,
    pub p90_uplift_cap_pct: f64,
    pub columns: ColumnNames,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Parameters in whole percent, the way operators quote thresholds
#[derive(Debug, Default, Deserialize)]
pub struct BacktestQuery {
    pub sim_threshold_pct: Option<u32>,
    pub min_combo_orders: Option<u32>,
    pub max_avg_delta: Option<f64>,
    pub p90_uplift_cap_pct: Option<u32>,
    /// Restrict the unlocked order detail to one combination
    pub combo: Option<String>,
}

impl BacktestQuery {
    pub fn apply(&self, mut params: SimulationParams) -> SimulationParams {
        if let Some(pct) = self.sim_threshold_pct {
            params.sim_threshold = pct as f64 / 100.0;
        }
        if let Some(n) = self.min_combo_orders {
            params.min_combo_orders = n;
        }
        if let Some(delta) = self.max_avg_delta {
            params.max_avg_delta = delta;
        }
        if let Some(pct) = self.p90_uplift_cap_pct {
            params.p90_uplift_cap = pct as f64 / 100.0;
        }
        params
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<BacktestService>;
type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: ServiceError) -> ApiError {
    match err {
        ServiceError::Backtest(BacktestError::MissingColumns(cols)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: format!("missing required columns: {}", cols.join(", ")),
                missing_columns: Some(cols),
            }),
        ),
        other => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: other.to_string(), missing_columns: None }),
        ),
    }
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/defaults
pub async fn get_defaults(State(service): State<AppState>) -> Json<DefaultsResponse> {
    let p = service.default_params();
    Json(DefaultsResponse {
        sim_threshold_pct: p.sim_threshold * 100.0,
        min_combo_orders: p.min_combo_orders,
        max_avg_delta: p.max_avg_delta,
        p90_uplift_cap_pct: p.p90_uplift_cap * 100.0,
        columns: service.columns().clone(),
    })
}

/// POST /api/v1/backtest with a CSV body
pub async fn run_backtest(
    State(service): State<AppState>,
    query: Result<Query<BacktestQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<BacktestReport>, ApiError> {
    let Query(query) = query.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.body_text(), missing_columns: None }),
        )
    })?;
    let params = query.apply(service.default_params());
    let result = tokio::task::spawn_blocking(move || service.run_csv(&body, params))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e.to_string(), missing_columns: None }),
            )
        })?;

    let mut report = result.map_err(error_response)?;
    if let Some(combo) = &query.combo {
        report.unlocked.retain(|o| &o.combination == combo);
    }
    Ok(Json(report))
}
