//! Request service: reads and state transitions backed by stored routines.
//!
//! The transition rules and history bookkeeping live in the `upgrade_state`
//! and `degrade_state` procedures; this layer only picks the right call.

use serde_json::Value;
use sqlx::PgPool;

use crate::db::{self, JsonFallback};
use crate::errors::AppError;
use crate::models::params::DateRange;
use crate::models::request::{NewRequest, Transition, UpdateState};

/// Requests that passed through a state during a date range.
pub async fn state_specific(
    pool: &PgPool,
    state_id: i32,
    range: &DateRange,
) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_state_specific_data($1, $2, $3)::text")
        .bind(state_id)
        .bind(range.start)
        .bind(range.end);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

/// Current requests submitted by a user.
pub async fn user_requests(pool: &PgPool, user_id: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_user_request_data($1)::text").bind(user_id);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

/// Requests waiting on the given role.
pub async fn todo(pool: &PgPool, role_id: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_todo_data($1)::text").bind(role_id);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

/// Full detail of one request.
pub async fn complete(pool: &PgPool, request_id: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_complete_data_of_request($1)::text").bind(request_id);
    db::fetch_json(pool, call, JsonFallback::EmptyObject).await
}

/// Every state the request has been in, oldest first.
pub async fn state_history(pool: &PgPool, request_id: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_full_state_history($1)::text").bind(request_id);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

pub async fn answers(pool: &PgPool, request_id: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_request_requirement_answer($1)::text").bind(request_id);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

pub async fn filenames(pool: &PgPool, request_id: i32) -> Result<Value, AppError> {
    let call = db::json_call("SELECT get_filenames($1)::text").bind(request_id);
    db::fetch_json(pool, call, JsonFallback::EmptyArray).await
}

/// Store a new request in the SUBMITTED state.
///
/// Attachments travel to the procedure as `bytea` next to their filenames.
pub async fn create(pool: &PgPool, request: &NewRequest) -> Result<(), AppError> {
    sqlx::query(
        "CALL create_new_request($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(&request.request_title)
    .bind(request.user_id)
    .bind(&request.requester_name)
    .bind(&request.analysis_purpose)
    .bind(request.requested_finish_date)
    .bind(&request.pic_request)
    .bind(request.urgent)
    .bind(request.requirement_type)
    .bind(&request.answers)
    .bind(request.docx.content())
    .bind(request.docx.filename())
    .bind(request.excel.content())
    .bind(request.excel.filename())
    .bind(&request.remark)
    .execute(pool)
    .await
    .map_err(AppError::from_procedure)?;

    tracing::info!(
        user_id = request.user_id,
        requirement_type = request.requirement_type,
        urgent = request.urgent,
        docx = request.docx.content().is_some(),
        excel = request.excel.content().is_some(),
        "New request submitted"
    );
    Ok(())
}

/// Move a request one state forward or back.
pub async fn transition(
    pool: &PgPool,
    direction: Transition,
    update: &UpdateState,
) -> Result<(), AppError> {
    let (sql, comment) = transition_call(direction, update);
    let mut query = sqlx::query(sql).bind(update.request_id).bind(update.user_id);
    if let Some(comment) = comment {
        query = query.bind(comment);
    }

    query
        .execute(pool)
        .await
        .map_err(AppError::from_procedure)?;

    tracing::info!(
        request_id = update.request_id,
        user_id = update.user_id,
        direction = ?direction,
        "Request state changed"
    );
    Ok(())
}

/// Procedure call for a transition and the comment it binds, if any.
///
/// `upgrade_state` has an overload without the comment. `degrade_state`
/// always takes one and gets `""` when none was given.
fn transition_call(direction: Transition, update: &UpdateState) -> (&'static str, Option<&str>) {
    match (direction, update.comment()) {
        (Transition::Upgrade, None) => ("CALL upgrade_state($1, $2)", None),
        (Transition::Upgrade, Some(comment)) => ("CALL upgrade_state($1, $2, $3)", Some(comment)),
        (Transition::Degrade, comment) => {
            ("CALL degrade_state($1, $2, $3)", Some(comment.unwrap_or("")))
        }
    }
}
