//! Domain events for the game session context.
//!
//! Events double as the outbound announcements the chat adapter renders:
//! every event names its [`Audience`].

use nightwatch_core::event::{DomainEvent, EventMetadata};
use nightwatch_core::outbound::Audience;
use nightwatch_core::player::PlayerId;
use serde::{Deserialize, Serialize};

use super::phase_clock::PhaseKind;

/// Emitted when a player joins (re-joining is reported but changes nothing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerJoined {
    /// The player.
    pub player: PlayerId,
    /// Roster size after the join.
    pub roster_size: usize,
}

/// Emitted when a player leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLeft {
    /// The player.
    pub player: PlayerId,
    /// Roster size after the departure.
    pub roster_size: usize,
}

/// Emitted when a role count is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfigured {
    /// Role name.
    pub role: String,
    /// New slot count.
    pub count: u32,
    /// Total role slots after the change.
    pub total_slots: usize,
}

/// Emitted when a phase length is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurationSet {
    /// Which phase.
    pub phase: PhaseKind,
    /// New length in seconds, used from the next phase of that kind.
    pub seconds: u64,
}

/// Emitted when a start proposal opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartProposed {
    /// Who asked to start.
    pub requester: PlayerId,
    /// Votes needed for a majority at the time of the proposal.
    pub required_votes: usize,
}

/// Emitted for every affirmative vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCast {
    /// The voter.
    pub player: PlayerId,
    /// Affirmative votes so far.
    pub votes: usize,
    /// Votes needed for a majority of the current roster.
    pub required_votes: usize,
}

/// Emitted for a negative vote; no state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDeclined {
    /// The voter.
    pub player: PlayerId,
}

/// Emitted when a proposal reaches a majority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPassed {
    /// Affirmative votes at the moment of passing.
    pub votes: usize,
    /// Roster size at the moment of passing.
    pub roster_size: usize,
    /// `false` when a game was already running and nothing was restarted.
    pub game_started: bool,
}

/// Private notification of a player's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssigned {
    /// The recipient.
    pub player: PlayerId,
    /// The role dealt to them.
    pub role: String,
}

/// Emitted whenever the clock enters a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStarted {
    /// The phase entered.
    pub phase: PhaseKind,
    /// Its length, fixed at entry.
    pub seconds: u64,
    /// 1 for the first day, incremented on every transition.
    pub cycle: u32,
}

/// Event type identifier for [`PlayerJoined`].
pub const PLAYER_JOINED_EVENT_TYPE: &str = "game.player_joined";

/// Event type identifier for [`PlayerLeft`].
pub const PLAYER_LEFT_EVENT_TYPE: &str = "game.player_left";

/// Event type identifier for [`RoleConfigured`].
pub const ROLE_CONFIGURED_EVENT_TYPE: &str = "game.role_configured";

/// Event type identifier for [`PhaseDurationSet`].
pub const PHASE_DURATION_SET_EVENT_TYPE: &str = "game.phase_duration_set";

/// Event type identifier for [`StartProposed`].
pub const START_PROPOSED_EVENT_TYPE: &str = "game.start_proposed";

/// Event type identifier for [`VoteCast`].
pub const VOTE_CAST_EVENT_TYPE: &str = "game.vote_cast";

/// Event type identifier for [`VoteDeclined`].
pub const VOTE_DECLINED_EVENT_TYPE: &str = "game.vote_declined";

/// Event type identifier for [`ProposalPassed`].
pub const PROPOSAL_PASSED_EVENT_TYPE: &str = "game.proposal_passed";

/// Event type identifier for [`RoleAssigned`].
pub const ROLE_ASSIGNED_EVENT_TYPE: &str = "game.role_assigned";

/// Event type identifier for [`PhaseStarted`].
pub const PHASE_STARTED_EVENT_TYPE: &str = "game.phase_started";

/// Event payload variants for the game session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// A player joined.
    PlayerJoined(PlayerJoined),
    /// A player left.
    PlayerLeft(PlayerLeft),
    /// A role count changed.
    RoleConfigured(RoleConfigured),
    /// A phase length changed.
    PhaseDurationSet(PhaseDurationSet),
    /// A start proposal opened.
    StartProposed(StartProposed),
    /// A player voted to start.
    VoteCast(VoteCast),
    /// A player voted against starting.
    VoteDeclined(VoteDeclined),
    /// A start proposal passed.
    ProposalPassed(ProposalPassed),
    /// A role was dealt to a player.
    RoleAssigned(RoleAssigned),
    /// The clock entered a phase.
    PhaseStarted(PhaseStarted),
}

impl GameEventKind {
    /// Dotted event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlayerJoined(_) => PLAYER_JOINED_EVENT_TYPE,
            Self::PlayerLeft(_) => PLAYER_LEFT_EVENT_TYPE,
            Self::RoleConfigured(_) => ROLE_CONFIGURED_EVENT_TYPE,
            Self::PhaseDurationSet(_) => PHASE_DURATION_SET_EVENT_TYPE,
            Self::StartProposed(_) => START_PROPOSED_EVENT_TYPE,
            Self::VoteCast(_) => VOTE_CAST_EVENT_TYPE,
            Self::VoteDeclined(_) => VOTE_DECLINED_EVENT_TYPE,
            Self::ProposalPassed(_) => PROPOSAL_PASSED_EVENT_TYPE,
            Self::RoleAssigned(_) => ROLE_ASSIGNED_EVENT_TYPE,
            Self::PhaseStarted(_) => PHASE_STARTED_EVENT_TYPE,
        }
    }

    /// Who should see this event.
    #[must_use]
    pub fn audience(&self) -> Audience {
        match self {
            Self::RoleAssigned(payload) => Audience::Direct(payload.player.clone()),
            _ => Audience::Channel,
        }
    }
}

/// Domain event envelope for the game session context.
#[derive(Debug, Clone)]
pub struct GameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GameEventKind,
}

impl DomainEvent for GameEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("GameEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
