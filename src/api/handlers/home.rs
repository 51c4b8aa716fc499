/*
 * Responsibility
 * - GET / (fixture ごとの landing)
 *   - plain / redis: text/plain の挨拶
 *   - status: DEBUG_MODE を含む JSON
 */
use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

pub const GREETING: &str = "Hello from Jerry!";

pub async fn greeting() -> &'static str {
    GREETING
}

#[derive(Debug, Serialize)]
pub struct StatusPage {
    pub status: &'static str,
    pub message: &'static str,
    pub debug: String,
}

/// JSON landing page of the status fixture. `debug` is `DEBUG_MODE` as read at startup.
pub async fn status(State(state): State<AppState>) -> Json<StatusPage> {
    Json(StatusPage {
        status: "healthy",
        message: "Jerry's app is running!",
        debug: state.config.debug_mode.clone(),
    })
}
