/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 全ルート共通: request id / access log / timeout
 */
pub mod http;
