//! Nightwatch party-game bot entry point.

use std::sync::Arc;

use nightwatch_bot::config::{BotConfig, TransportMode};
use nightwatch_bot::console::run_console;
use nightwatch_bot::error::AppError;
use nightwatch_bot::routes;
use nightwatch_bot::runtime::SessionActor;
use nightwatch_bot::sinks::{ConsoleSink, OutboxSink};
use nightwatch_bot::state::AppState;
use nightwatch_core::clock::SystemClock;
use nightwatch_core::rng::StdRandom;
use nightwatch_game::domain::aggregates::GameSession;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const ACTOR_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber. Stdout belongs to the console transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Starting Nightwatch bot");

    let config = BotConfig::from_env()?;
    let session = GameSession::new(Uuid::new_v4(), config.durations);
    let clock = Arc::new(SystemClock);
    let rng = Box::new(StdRandom::from_os_rng());

    match config.mode {
        TransportMode::Console => {
            let actor = SessionActor::new(
                session,
                clock,
                rng,
                Arc::new(ConsoleSink::new()),
                config.command_prefix.clone(),
            );
            let (handle, task) = actor.spawn(ACTOR_BUFFER);
            run_console(handle).await?;
            let _ = task.await;
        }
        TransportMode::Http => {
            let outbox = Arc::new(OutboxSink::new(config.outbox_capacity));
            let actor = SessionActor::new(
                session,
                clock,
                rng,
                outbox.clone(),
                config.command_prefix.clone(),
            );
            let (handle, _task) = actor.spawn(ACTOR_BUFFER);
            let app = routes::app(AppState::new(handle, outbox));

            let addr = config.bind_addr()?;
            tracing::info!("Listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
