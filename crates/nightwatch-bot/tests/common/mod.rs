//! Shared test helpers for bot integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use nightwatch_bot::routes;
use nightwatch_bot::runtime::{Dispatch, InboundMessage, SessionActor, SessionHandle};
use nightwatch_bot::sinks::OutboxSink;
use nightwatch_bot::state::AppState;
use nightwatch_core::outbound::MessageSink;
use nightwatch_core::player::PlayerId;
use nightwatch_core::rng::DeterministicRng;
use nightwatch_game::domain::aggregates::GameSession;
use nightwatch_game::domain::phase_clock::PhaseDurations;
use nightwatch_test_support::{ManualClock, MockRng};
use tower::ServiceExt;
use uuid::Uuid;

/// Spawn a session actor on virtual time, delivering to `sink`.
pub fn spawn_session(
    sink: Arc<dyn MessageSink>,
    rng: Box<dyn DeterministicRng>,
) -> (SessionHandle, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let actor = SessionActor::new(
        GameSession::new(Uuid::new_v4(), PhaseDurations::default()),
        clock.clone(),
        rng,
        sink,
        "/",
    );
    let (handle, _task) = actor.spawn(16);
    (handle, clock)
}

/// Send one chat line as `player`.
pub async fn say(handle: &SessionHandle, player: &str, text: &str) -> Dispatch {
    handle
        .submit(InboundMessage {
            player: PlayerId::new(player),
            text: text.to_owned(),
        })
        .await
        .unwrap()
}

/// Build the full app router backed by an outbox and virtual time. Uses the
/// same route structure as `main.rs`.
pub fn build_test_app() -> (Router, Arc<ManualClock>, Arc<OutboxSink>) {
    let outbox = Arc::new(OutboxSink::new(256));
    let (handle, clock) = spawn_session(outbox.clone(), Box::new(MockRng));
    let app = routes::app(AppState::new(handle, outbox.clone()));
    (app, clock, outbox)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Post a chat message through the HTTP surface.
pub async fn chat(app: &Router, player: &str, text: &str) -> (StatusCode, serde_json::Value) {
    post_json(
        app.clone(),
        "/api/v1/session/messages",
        &serde_json::json!({ "player": player, "text": text }),
    )
    .await
}
