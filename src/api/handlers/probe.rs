/*
 * Responsibility
 * - GET /test-redis
 * - probe の実行は services::probe に任せる。ここは JSON に詰めるだけ
 */
use axum::{Json, extract::State};

use crate::error::{AppError, StatusMessage};
use crate::services::probe;
use crate::state::AppState;

pub async fn test_redis(State(state): State<AppState>) -> Result<Json<StatusMessage>, AppError> {
    let report = probe::run(state.cache.as_ref(), &state.config.probe_policy).await?;
    tracing::debug!(attempts = report.attempts, "probe request succeeded");

    Ok(Json(StatusMessage::success("Redis connection works!")))
}
