//! Domain error types.

use thiserror::Error;

use crate::player::PlayerId;

/// Top-level domain error type.
///
/// Every variant except `NotificationDeliveryFailed` and `Infrastructure`
/// is a synchronous rejection of the triggering command and is raised before
/// any state is touched.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed command input (non-numeric count, bad phase token, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A start was requested with fewer players than role slots.
    #[error("insufficient players: {players} joined but {slots} role slots are configured")]
    InsufficientPlayers {
        /// Current roster size.
        players: usize,
        /// Total configured role slots.
        slots: usize,
    },

    /// A vote arrived while no start proposal is open.
    #[error("no start proposal is open")]
    ProposalNotOpen,

    /// A vote arrived from a player who is not on the roster.
    #[error("player {0} has not joined the game")]
    NotEligible(PlayerId),

    /// The command policy refused the command in the current phase.
    #[error("command {command} is not permitted during the {phase} phase")]
    CommandNotPermitted {
        /// The refused command type.
        command: &'static str,
        /// The phase the session was in.
        phase: String,
    },

    /// A direct notification to one player could not be delivered.
    #[error("notification to {player} failed: {reason}")]
    NotificationDeliveryFailed {
        /// The intended recipient.
        player: PlayerId,
        /// Transport-specific failure description.
        reason: String,
    },

    /// An infrastructure error (closed channel, I/O failure, ...).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InsufficientPlayers { .. } => "insufficient_players",
            Self::ProposalNotOpen => "proposal_not_open",
            Self::NotEligible(_) => "not_eligible",
            Self::CommandNotPermitted { .. } => "command_not_permitted",
            Self::NotificationDeliveryFailed { .. } => "notification_delivery_failed",
            Self::Infrastructure(_) => "infrastructure_error",
        }
    }
}
