use std::sync::Arc;

use crate::config::ServerConfig;

/// Handed to every handler through `State<AppState>`. Clones share the pool
/// and the config.
#[derive(Clone)]
pub struct AppState {
    pub pool: gurmania_db::DbPool,
    pub config: Arc<ServerConfig>,
}
