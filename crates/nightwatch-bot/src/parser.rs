//! Text command parsing.
//!
//! A chat message is a command when it starts with the configured prefix.
//! The first whitespace-separated word names the command; unknown words are
//! ignored, like any other chatter.

use nightwatch_core::error::DomainError;
use nightwatch_game::domain::phase_clock::PhaseKind;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `join`
    Join,
    /// `leave`
    Leave,
    /// `setrole <name> <count>`
    SetRole {
        /// Role name.
        role: String,
        /// Requested count; sign is checked by the session.
        count: i64,
    },
    /// `settime <day|night> <seconds>`
    SetTime {
        /// Which phase.
        phase: PhaseKind,
        /// Requested length; sign is checked by the session.
        seconds: i64,
    },
    /// `start`
    Start,
    /// `agree`
    Agree,
    /// `disagree`
    Disagree,
    /// `status`
    Status,
    /// `help`
    Help,
}

fn usage(prefix: &str, form: &str) -> DomainError {
    DomainError::InvalidArgument(format!("usage: {prefix}{form}"))
}

/// Parses `text` as a command.
///
/// Returns `Ok(None)` for messages that are not commands.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` when `setrole` or `settime` has
/// missing or malformed arguments.
pub fn parse(prefix: &str, text: &str) -> Result<Option<ChatCommand>, DomainError> {
    let Some(body) = text.strip_prefix(prefix) else {
        return Ok(None);
    };
    let mut args = body.split_whitespace();
    let Some(name) = args.next() else {
        return Ok(None);
    };

    let command = match name {
        "join" => ChatCommand::Join,
        "leave" => ChatCommand::Leave,
        "setrole" => {
            let form = "setrole <role> <count>";
            let role = args.next().ok_or_else(|| usage(prefix, form))?;
            let count = args
                .next()
                .and_then(|raw| raw.parse::<i64>().ok())
                .ok_or_else(|| usage(prefix, form))?;
            ChatCommand::SetRole {
                role: role.to_owned(),
                count,
            }
        }
        "settime" => {
            let form = "settime day|night <seconds>";
            let phase = args
                .next()
                .ok_or_else(|| usage(prefix, form))?
                .parse::<PhaseKind>()
                .map_err(|_| usage(prefix, form))?;
            let seconds = args
                .next()
                .and_then(|raw| raw.parse::<i64>().ok())
                .ok_or_else(|| usage(prefix, form))?;
            ChatCommand::SetTime { phase, seconds }
        }
        "start" => ChatCommand::Start,
        "agree" => ChatCommand::Agree,
        "disagree" => ChatCommand::Disagree,
        "status" => ChatCommand::Status,
        "help" => ChatCommand::Help,
        _ => return Ok(None),
    };
    Ok(Some(command))
}
