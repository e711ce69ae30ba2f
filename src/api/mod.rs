pub mod agents;
pub mod error;
pub mod extract;
pub mod leads;
pub mod profile;
pub mod routes;

pub use error::ApiError;
pub use extract::ApiJson;
pub use routes::{cors_layer, create_router};

use crate::auth::UserStore;
use crate::store::Database;
use serde::Serialize;
use std::sync::Arc;

/// Shared state for the protected resource routes
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub user_store: Arc<UserStore>,
}

/// `{"message": ...}` body for endpoints that only acknowledge
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
