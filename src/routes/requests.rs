//! Request routes: listings, details, submission, and state transitions.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde_json::Value;

use crate::errors::{AppError, MessageResponse};
use crate::models::params::{required_id, RequestQuery, RoleQuery, UserQuery};
use crate::models::request::{NewRequestForm, Transition, UpdateState};
use crate::services::requests as request_service;
use crate::AppState;

/// GET /api/userRequestsData: a user's current requests.
pub async fn user_requests(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = required_id(&query.user_id, "userId")?;
    Ok(Json(request_service::user_requests(&state.db, user_id).await?))
}

/// GET /api/todoData: requests waiting on a role.
pub async fn todo(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Value>, AppError> {
    let role_id = required_id(&query.role_id, "roleId")?;
    Ok(Json(request_service::todo(&state.db, role_id).await?))
}

/// GET /api/completeRequestData
pub async fn complete(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, AppError> {
    let request_id = required_id(&query.request_id, "requestId")?;
    Ok(Json(request_service::complete(&state.db, request_id).await?))
}

/// GET /api/fullStateHistoryData
pub async fn state_history(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, AppError> {
    let request_id = required_id(&query.request_id, "requestId")?;
    Ok(Json(request_service::state_history(&state.db, request_id).await?))
}

/// GET /api/answerData
pub async fn answers(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, AppError> {
    let request_id = required_id(&query.request_id, "requestId")?;
    Ok(Json(request_service::answers(&state.db, request_id).await?))
}

/// GET /api/getFilenames
pub async fn filenames(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Value>, AppError> {
    let request_id = required_id(&query.request_id, "requestId")?;
    Ok(Json(request_service::filenames(&state.db, request_id).await?))
}

/// POST /api/newRequest: submit a request (multipart form).
///
/// Attachment parts are read whole and passed to the database with the form.
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let mut form = NewRequestForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if field.file_name().is_some() || name.ends_with("Attachment") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
            let size = bytes.len();
            if form.attach(&name, file_name.as_deref(), bytes.to_vec()) {
                tracing::debug!(field = %name, size, "Attachment received");
            } else {
                tracing::debug!(field = %name, size, "Ignoring unexpected file part");
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
            form.set(&name, text)?;
        }
    }

    let request = form.finish()?;
    request_service::create(&state.db, &request).await?;
    Ok(MessageResponse::success("Request submitted."))
}

/// PUT /api/upgradeState: advance a request to its next state.
pub async fn upgrade(
    State(state): State<AppState>,
    Json(body): Json<UpdateState>,
) -> Result<Json<MessageResponse>, AppError> {
    change_state(&state, Transition::Upgrade, &body).await
}

/// PUT /api/degradeState: send a request back one state.
pub async fn degrade(
    State(state): State<AppState>,
    Json(body): Json<UpdateState>,
) -> Result<Json<MessageResponse>, AppError> {
    change_state(&state, Transition::Degrade, &body).await
}

async fn change_state(
    state: &AppState,
    direction: Transition,
    body: &UpdateState,
) -> Result<Json<MessageResponse>, AppError> {
    request_service::transition(&state.db, direction, body).await?;
    Ok(MessageResponse::new(direction.success_message()))
}
