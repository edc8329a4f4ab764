//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::{EntityRegistry, ScheduleCache};
use crate::services::RefreshTracker;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ScheduleCache>,
    pub registry: Arc<EntityRegistry>,
    /// Outcomes of the background refresh, for the status endpoint
    pub tracker: RefreshTracker,
}

impl AppState {
    pub fn new(
        cache: Arc<ScheduleCache>,
        registry: Arc<EntityRegistry>,
        tracker: RefreshTracker,
    ) -> Self {
        Self {
            cache,
            registry,
            tracker,
        }
    }
}
