//! Application state shared across handlers

use std::sync::Arc;

use crate::{config::AuthConfig, service::UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub credentials: Arc<AuthConfig>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        user_service: UserService,
        credentials: AuthConfig,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            user_service,
            credentials: Arc::new(credentials),
            max_upload_bytes,
        }
    }
}
