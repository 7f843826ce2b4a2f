//! Shared application state.

use std::sync::Arc;

use crate::runtime::SessionHandle;
use crate::sinks::OutboxSink;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the session actor.
    pub session: SessionHandle,
    /// Messages waiting for a chat bridge to pick up.
    pub outbox: Arc<OutboxSink>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(session: SessionHandle, outbox: Arc<OutboxSink>) -> Self {
        Self { session, outbox }
    }
}
