use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;
use crate::errors::AppError;
use crate::services::session::SessionIssuer;
use crate::services::uploads::ImageStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub sessions: SessionIssuer,
    pub images: ImageStore,
}

impl AppState {
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        db::lock(&self.db)
    }
}
