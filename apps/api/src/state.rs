use std::sync::Arc;

use crate::providers::ClientProvider;
use crate::screening::orchestrator::ScreeningSettings;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Builds fresh model clients for each screening run.
    pub clients: Arc<dyn ClientProvider>,
    pub settings: ScreeningSettings,
}
