//! Progress-page routes: state counts, per-state listings, and period bounds.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::params::{required_id, DateRangeQuery, StateRangeQuery};
use crate::services::catalog;
use crate::services::requests as request_service;
use crate::services::state_count::{self, StateReport};
use crate::AppState;

/// GET /api/stateCountData: six-row pipeline report for a date range.
pub async fn state_count(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<StateReport>, AppError> {
    let range = query.parse()?;
    let report = state_count::state_count(&state.db, &range).await?;
    Ok(Json(report))
}

/// GET /api/stateSpecificData: requests that passed through one state.
pub async fn state_specific(
    State(state): State<AppState>,
    Query(query): Query<StateRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let state_id = required_id(&query.state_id, "stateId")?;
    let range = query.range.parse()?;
    let data = request_service::state_specific(&state.db, state_id, &range).await?;
    Ok(Json(data))
}

/// GET /api/getOldestRequestTime
pub async fn oldest_request(
    State(state): State<AppState>,
) -> Result<Json<DateTime<Utc>>, AppError> {
    let oldest = catalog::oldest_request(&state.db).await?;
    Ok(Json(oldest))
}

/// GET /api/getStateThreshold
pub async fn state_threshold(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let data = catalog::state_thresholds(&state.db).await?;
    Ok(Json(data))
}
