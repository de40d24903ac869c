//! Unified error handling with a consistent JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error detail returned to clients.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// JSON body of every error response: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ApiError,
}

/// Plain acknowledgement returned by write endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            status: None,
            message: message.to_string(),
        })
    }

    pub fn success(message: &str) -> Json<Self> {
        Json(Self {
            status: Some("success"),
            message: message.to_string(),
        })
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing query parameter: {0}")]
    MissingParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map an error from a state-changing procedure.
    ///
    /// Procedures reject illegal moves with `RAISE EXCEPTION` (SQLSTATE class
    /// `P0`); those messages go back to the caller as transition errors.
    pub fn from_procedure(err: sqlx::Error) -> Self {
        let raised = err
            .as_database_error()
            .filter(|db| db.code().is_some_and(|code| code.starts_with("P0")))
            .map(|db| db.message().to_string());

        match raised {
            Some(message) => Self::InvalidTransition(message),
            None => Self::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                "MISSING_PARAMETER",
                format!("Missing query parameter: {name}"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidTransition(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_TRANSITION", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ApiError {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_response_omits_status() {
        let json = serde_json::to_value(&MessageResponse::new("State updated successfully").0)
            .unwrap();
        assert_eq!(json, serde_json::json!({ "message": "State updated successfully" }));
    }

    #[test]
    fn message_response_success() {
        let json = serde_json::to_value(&MessageResponse::success("Request submitted.").0).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Request submitted.");
    }

    #[test]
    fn missing_parameter_is_bad_request() {
        let response = AppError::MissingParameter("startDate".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_is_internal() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_status() {
        let err = AppError::NotFound("request".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn client_errors_are_bad_request() {
        for err in [
            AppError::Validation("x".to_string()),
            AppError::InvalidTransition("x".to_string()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            AppError::Internal("x".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn app_error_display() {
        let err = AppError::MissingParameter("roleId".to_string());
        assert_eq!(err.to_string(), "Missing query parameter: roleId");
    }

    #[test]
    fn non_database_procedure_errors_stay_database() {
        let err = AppError::from_procedure(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn app_error_from_sqlx() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
