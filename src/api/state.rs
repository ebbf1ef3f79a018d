//! Application state for the API server

use crate::Config;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone). There is deliberately nothing
/// here beyond the immutable configuration: jobs are ephemeral and owned by
/// their request-handling flow, never tracked across requests.
#[derive(Clone)]
pub struct AppState {
    /// Immutable server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}
