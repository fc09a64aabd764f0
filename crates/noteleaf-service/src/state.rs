//! Application state.

use std::sync::Arc;

use noteleaf_store::RocksStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!("Service API key not configured - action reporting will be rejected");
        }

        Self { store, config }
    }
}
