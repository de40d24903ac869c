//! Requirement questionnaire routes.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::params::{required_id, RequirementQuery};
use crate::services::catalog;
use crate::AppState;

/// GET /api/questionData: questions for a requirement type.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RequirementQuery>,
) -> Result<Json<Value>, AppError> {
    let requirement_type = required_id(&query.requirement_type, "requirementType")?;
    Ok(Json(catalog::questions(&state.db, requirement_type).await?))
}
