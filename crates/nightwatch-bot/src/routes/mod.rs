//! HTTP routes.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod health;
pub mod outbox;
pub mod session;

/// Builds the full HTTP application.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the chat bridge's origin once it is deployed.
    Router::new()
        .merge(health::router())
        .nest("/api/v1/session", session::router())
        .nest("/api/v1/outbox", outbox::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use nightwatch_game::domain::aggregates::GameSession;
    use nightwatch_game::domain::phase_clock::PhaseDurations;
    use nightwatch_test_support::{ManualClock, MockRng};
    use uuid::Uuid;

    use crate::runtime::SessionActor;
    use crate::sinks::OutboxSink;
    use crate::state::AppState;

    /// State backed by a live actor whose sink is the outbox.
    pub(crate) fn test_app_state() -> AppState {
        let outbox = Arc::new(OutboxSink::new(64));
        let actor = SessionActor::new(
            GameSession::new(Uuid::new_v4(), PhaseDurations::default()),
            Arc::new(ManualClock::default()),
            Box::new(MockRng),
            outbox.clone(),
            "/",
        );
        let (handle, _task) = actor.spawn(16);
        AppState::new(handle, outbox)
    }
}
