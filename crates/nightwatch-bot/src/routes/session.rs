//! Routes for the game session.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use nightwatch_core::outbound::OutboundMessage;
use nightwatch_core::player::PlayerId;
use nightwatch_game::application::query_handlers::SessionView;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::runtime::{Dispatch, InboundMessage};
use crate::state::AppState;

/// Request body for POST /messages.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// The chat participant who sent the message.
    pub player: PlayerId,
    /// The raw message text.
    pub text: String,
}

/// Response body returned after a message is processed.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Whether the message was a command.
    pub handled: bool,
    /// Messages rendered for the command, in delivery order.
    pub replies: Vec<OutboundMessage>,
    /// Error messages for replies the chat could not receive.
    pub delivery_failures: Vec<String>,
}

/// GET /
async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let view = state.session.status().await?;
    Ok(Json(view))
}

/// POST /messages
#[instrument(skip(state, request), fields(player = %request.player))]
async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let dispatch = state
        .session
        .submit(InboundMessage {
            player: request.player,
            text: request.text,
        })
        .await?;

    match dispatch {
        Dispatch::Ignored => Ok(Json(MessageResponse {
            handled: false,
            replies: Vec::new(),
            delivery_failures: Vec::new(),
        })),
        Dispatch::Handled { replies, delivery } => {
            info!(replies = replies.len(), "chat command handled");
            Ok(Json(MessageResponse {
                handled: true,
                replies,
                delivery_failures: delivery.failures.iter().map(ToString::to_string).collect(),
            }))
        }
        Dispatch::Rejected { error, .. } => Err(ApiError(error)),
    }
}

/// Returns the router for the session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/messages", post(post_message))
}
