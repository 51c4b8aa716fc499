/*
 * Responsibility
 * - fixture variant ごとの URL 構造を定義
 * - 未知の path は 404 (body なし)
 */
use axum::{Router, http::StatusCode, routing::get};

use crate::api::handlers::{health, home, probe};
use crate::config::FixtureVariant;
use crate::state::AppState;

pub fn routes(variant: FixtureVariant) -> Router<AppState> {
    let router = match variant {
        FixtureVariant::Plain => Router::new()
            .route("/", get(home::greeting))
            .route("/health", get(health::healthy)),
        FixtureVariant::Redis => Router::new()
            .route("/", get(home::greeting))
            .route("/health", get(health::healthy))
            .route("/test-redis", get(probe::test_redis)),
        FixtureVariant::Status => Router::new()
            .route("/", get(home::status))
            .route("/health", get(health::ok)),
    };

    router.fallback(not_found)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
