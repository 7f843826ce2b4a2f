//! Which commands are accepted in which phase.
//!
//! Every session command passes through [`ensure_permitted`]. Today the game
//! accepts every command in every phase (players may join, leave and
//! reconfigure roles mid-game, and a new start proposal may be opened while
//! a game runs); tightening that is a change to [`permits`] alone.

use nightwatch_core::error::DomainError;

use super::phase_clock::Phase;

/// Session commands subject to the phase policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `join`
    Join,
    /// `leave`
    Leave,
    /// `setrole`
    SetRole,
    /// `settime`
    SetTime,
    /// `start`
    RequestStart,
    /// `agree` / `disagree`
    Vote,
}

impl CommandKind {
    /// Command name as typed in chat.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::SetRole => "setrole",
            Self::SetTime => "settime",
            Self::RequestStart => "start",
            Self::Vote => "vote",
        }
    }
}

/// Whether `kind` may run while the session is in `phase`.
#[must_use]
pub fn permits(kind: CommandKind, phase: Phase) -> bool {
    match (kind, phase) {
        (_, Phase::Waiting | Phase::Day | Phase::Night) => true,
    }
}

/// Rejects `kind` if the policy does not permit it in `phase`.
///
/// # Errors
///
/// Returns `DomainError::CommandNotPermitted`.
pub fn ensure_permitted(kind: CommandKind, phase: Phase) -> Result<(), DomainError> {
    if permits(kind, phase) {
        Ok(())
    } else {
        Err(DomainError::CommandNotPermitted {
            command: kind.name(),
            phase: phase.to_string(),
        })
    }
}
