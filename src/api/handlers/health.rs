/*
 * Responsibility
 * - GET /health (疎通用)
 * - 依存サービスの状態に関係なく常に 200
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// `{"status":"healthy"}`, served by the plain and redis fixtures.
pub async fn healthy() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

/// `{"status":"ok"}`, served by the status fixture.
pub async fn ok() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
