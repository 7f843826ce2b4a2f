//! Console transport: one `<player> <message>` per stdin line.

use nightwatch_core::player::PlayerId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::error::AppError;
use crate::runtime::{InboundMessage, SessionHandle};

/// Splits a console line into the speaking player and the message.
///
/// Returns `None` for blank lines and lines without a message.
#[must_use]
pub fn split_line(line: &str) -> Option<(PlayerId, String)> {
    let (player, text) = line.trim().split_once(char::is_whitespace)?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some((PlayerId::new(player), text.to_owned()))
}

/// Feeds stdin to the session until end of input.
///
/// # Errors
///
/// Returns `AppError::Server` if stdin cannot be read.
pub async fn run_console(handle: SessionHandle) -> Result<(), AppError> {
    info!("reading chat from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some((player, text)) = split_line(&line) else {
            continue;
        };
        if let Err(err) = handle.submit(InboundMessage { player, text }).await {
            warn!(error = %err, "session unavailable");
            break;
        }
    }
    info!("stdin closed");
    Ok(())
}
