//! Outbox polling for chat bridges.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::sinks::OutboxEntry;
use crate::state::AppState;

/// Query string for GET /.
#[derive(Debug, Default, Deserialize)]
pub struct OutboxQuery {
    /// Only entries with a greater sequence number are returned.
    #[serde(default)]
    pub after: u64,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct OutboxResponse {
    /// Pending entries, oldest first.
    pub entries: Vec<OutboxEntry>,
    /// Sequence number to pass as `after` next time.
    pub last_seq: u64,
}

/// GET /
async fn poll_outbox(
    State(state): State<AppState>,
    Query(query): Query<OutboxQuery>,
) -> Result<Json<OutboxResponse>, ApiError> {
    let entries = state.outbox.after(query.after)?;
    let last_seq = entries.last().map_or(query.after, |entry| entry.seq);
    Ok(Json(OutboxResponse { entries, last_seq }))
}

/// Returns the router for the outbox.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(poll_outbox))
}
