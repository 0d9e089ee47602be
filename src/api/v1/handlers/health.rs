/*
 * Responsibility
 * - GET /health (liveness; never touches the auth backend)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "backend": state.backend().backend_name(),
            "bearer_auth": state.resolver.bearer_enabled(),
        })),
    )
}
