// src/state.rs

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;

/// Shared handler state. Handlers pull out only the part they need.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
