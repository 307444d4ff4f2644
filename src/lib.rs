use std::sync::Arc;

use chrono::{DateTime, Utc};

pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod result;
pub mod router;
pub mod routes;
pub mod utils;

use auth::SessionManager;
use config::Config;
use database::{NoteStore, UserStore};

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub notes: Arc<dyn NoteStore>,
    pub sessions: Arc<SessionManager>,
    pub config: Arc<Config>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
        sessions: SessionManager,
        config: Config,
    ) -> Self {
        Self {
            users,
            notes,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }
}
