//! Commands for the game session context.
//!
//! Arguments arrive already parsed; numeric values are kept signed so the
//! domain, not the parser, decides that negatives are invalid.

use nightwatch_core::command::Command;
use nightwatch_core::player::PlayerId;
use uuid::Uuid;

use super::phase_clock::PhaseKind;

/// Command to add a player to the roster.
#[derive(Debug, Clone)]
pub struct JoinGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The joining player.
    pub player: PlayerId,
}

impl Command for JoinGame {
    fn command_type(&self) -> &'static str {
        "game.join"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a player from the roster.
#[derive(Debug, Clone)]
pub struct LeaveGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The leaving player.
    pub player: PlayerId,
}

impl Command for LeaveGame {
    fn command_type(&self) -> &'static str {
        "game.leave"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to set the slot count of a role.
#[derive(Debug, Clone)]
pub struct ConfigureRole {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Role name.
    pub role: String,
    /// Requested count.
    pub count: i64,
}

impl Command for ConfigureRole {
    fn command_type(&self) -> &'static str {
        "game.configure_role"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to set the length of day or night.
#[derive(Debug, Clone)]
pub struct SetPhaseDuration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Which phase.
    pub phase: PhaseKind,
    /// Requested length in seconds.
    pub seconds: i64,
}

impl Command for SetPhaseDuration {
    fn command_type(&self) -> &'static str {
        "game.set_phase_duration"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to open a start proposal.
#[derive(Debug, Clone)]
pub struct RequestStart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who asked.
    pub requester: PlayerId,
}

impl Command for RequestStart {
    fn command_type(&self) -> &'static str {
        "game.request_start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to vote on the open start proposal.
#[derive(Debug, Clone)]
pub struct CastVote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The voter.
    pub player: PlayerId,
    /// `true` for `agree`, `false` for `disagree`.
    pub agree: bool,
}

impl Command for CastVote {
    fn command_type(&self) -> &'static str {
        if self.agree {
            "game.vote_agree"
        } else {
            "game.vote_disagree"
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
