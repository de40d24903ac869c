//! Route definitions for the request-tracking API.

pub mod dashboard;
pub mod health;
pub mod questions;
pub mod requests;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Upper bound for a request body, sized for form submissions with attachments.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/stateCountData", get(dashboard::state_count))
        .route("/stateSpecificData", get(dashboard::state_specific))
        .route("/getOldestRequestTime", get(dashboard::oldest_request))
        .route("/getStateThreshold", get(dashboard::state_threshold))
        .route("/userRequestsData", get(requests::user_requests))
        .route("/todoData", get(requests::todo))
        .route("/completeRequestData", get(requests::complete))
        .route("/fullStateHistoryData", get(requests::state_history))
        .route("/answerData", get(requests::answers))
        .route("/getFilenames", get(requests::filenames))
        .route("/questionData", get(questions::list))
        .route("/newRequest", post(requests::create))
        .route("/upgradeState", put(requests::upgrade))
        .route("/degradeState", put(requests::degrade));

    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
}
