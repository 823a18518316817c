use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::ordering::Positioner;
use crate::relay::RoomManager;

/// Shared application state available to all handlers via axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub rooms: Arc<RoomManager>,
    pub positioner: Arc<dyn Positioner>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            db,
            rooms: Arc::new(RoomManager::new()),
            positioner: config.positioner.build(),
            config: Arc::new(config),
        }
    }
}
