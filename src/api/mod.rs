/*
 * Responsibility
 * - URL 構造の公開 (routes() の re-export)
 */
pub mod handlers;
mod routes;

pub use routes::routes;
