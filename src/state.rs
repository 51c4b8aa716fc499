/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - config: 起動時に読んだ設定 (immutable)
 *   - cache: probe 用の connector (接続はリクエストごとに張る)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::cache::CacheConnector;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<dyn CacheConnector>,
}

impl AppState {
    pub fn new(config: Arc<Config>, cache: Arc<dyn CacheConnector>) -> Self {
        Self { config, cache }
    }
}
