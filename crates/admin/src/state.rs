//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::AdminBackend;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: AdminBackend,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let backend = AdminBackend::new(&config.backend);

        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn backend(&self) -> &AdminBackend {
        &self.inner.backend
    }
}
