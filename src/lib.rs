pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::middleware::rbac::RolePolicy;
use crate::repository::Repositories;
use crate::services::permissions::PermissionSource;
use crate::services::status::{Clock, SystemClock};

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub repositories: Repositories,
    pub permissions: Arc<dyn PermissionSource>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State with the default role policy and the system clock.
    pub fn new(config: config::AppConfig, repositories: Repositories) -> Self {
        Self {
            config,
            repositories,
            permissions: Arc::new(RolePolicy),
            clock: Arc::new(SystemClock),
        }
    }
}
