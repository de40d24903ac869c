//! Reference data: requirement questions, state thresholds, and the
//! earliest request date used to bound the period picker.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::db::{self, JsonFallback};
use crate::errors::AppError;

/// Questionnaire for a requirement type.
pub async fn questions(pool: &PgPool, requirement_type: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_questions($1)::text").bind(requirement_type);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

/// Per-state duration thresholds used for overdue warnings.
pub async fn state_thresholds(pool: &PgPool) -> Result<Value, AppError> {
    db::fetch_json(
        pool,
        db::json_call("SELECT get_state_threshold()::text"),
        JsonFallback::EmptyArray,
    )
    .await
}

/// Submission time of the oldest request.
pub async fn oldest_request(pool: &PgPool) -> Result<DateTime<Utc>, AppError> {
    sqlx::query_scalar::<_, Option<DateTime<Utc>>>("SELECT get_oldest_request()::timestamptz")
        .fetch_one(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No requests have been submitted yet".to_string()))
}
