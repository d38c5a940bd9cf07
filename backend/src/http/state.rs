//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::PersonLogic;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Logic layer every handler delegates to
    pub logic: Arc<dyn PersonLogic>,
}

impl AppState {
    pub fn new(logic: Arc<dyn PersonLogic>) -> Self {
        Self { logic }
    }
}
