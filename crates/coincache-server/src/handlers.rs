//! HTTP request handlers.

use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Query parameters for `GET /coins`.
#[derive(Debug, Deserialize)]
pub struct CoinQuery {
    name: Option<String>,
}

/// `GET /coins?name=<coin>`, the read-through cache entry point.
///
/// Responses: 200 with the serialized snapshot, 400 when the name parameter
/// is missing, 404 when nothing could be served even after a refresh
/// attempt, 500 for storage failures.
pub async fn handle_coin(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoinQuery>,
) -> Response {
    let name = match query.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing 'name' query parameter",
            );
        }
    };

    match state.coordinator.get_or_refresh(&name).await {
        Ok(coin) => (StatusCode::OK, Json(coin)).into_response(),
        Err(err) => {
            let status = StatusCode::from_u16(err.to_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!("Request for '{}' failed: {}", name, err);
            }
            error_response(status, &err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
