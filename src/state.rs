use std::sync::Arc;

use crate::application::services::auth::SessionStore;
use crate::application::services::notifications::Notifier;
use crate::infrastructure::config::Config;
use crate::infrastructure::data::db_context::surrealdb_context::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Db, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions: SessionStore::new(),
            notifier,
        }
    }
}
