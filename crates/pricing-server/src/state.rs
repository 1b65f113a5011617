//! Application State

use std::sync::Arc;

use crate::polar::PolarClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Polar client, or why it could not be configured
    pub polar: Result<Arc<PolarClient>, String>,
}

impl AppState {
    pub fn polar_configured(&self) -> bool {
        self.polar.is_ok()
    }
}
