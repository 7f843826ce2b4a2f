//! Query handlers for the game session context.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nightwatch_core::player::PlayerId;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::GameSession;
use crate::domain::phase_clock::{Phase, PhaseDurations};

/// Read-only view of the session.
///
/// Role assignments are deliberately reduced to a count: who holds which
/// role is secret.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Coarse phase.
    pub phase: Phase,
    /// Joined players in roster order.
    pub players: Vec<PlayerId>,
    /// Role name → slot count.
    pub roles: BTreeMap<String, u32>,
    /// Sum of role counts.
    pub total_slots: usize,
    /// Configured phase lengths.
    pub durations: PhaseDurations,
    /// Whether a start proposal is open.
    pub proposal_open: bool,
    /// Affirmative votes on the open proposal.
    pub votes: Vec<PlayerId>,
    /// Cycle of the running phase (0 before the game starts).
    pub cycle: u32,
    /// When the running phase ends.
    pub phase_ends_at: Option<DateTime<Utc>>,
    /// How many players were dealt a role.
    pub assigned_players: usize,
    /// Current version (event count).
    pub version: i64,
}

/// Builds the read-only view of `session`.
#[must_use]
pub fn get_session_view(session: &GameSession) -> SessionView {
    let running = session.phase_clock().running();
    SessionView {
        session_id: session.id,
        phase: session.phase(),
        players: session.roster().iter().cloned().collect(),
        roles: session
            .role_config()
            .iter()
            .map(|(name, count)| (name.to_owned(), count))
            .collect(),
        total_slots: session.role_config().total_slots(),
        durations: session.durations(),
        proposal_open: session.vote_gate().is_open(),
        votes: session.vote_gate().votes().iter().cloned().collect(),
        cycle: running.map_or(0, |r| r.cycle),
        phase_ends_at: running.map(|r| r.ends_at()),
        assigned_players: session.assignment().map_or(0, |a| a.len()),
        version: session.version,
    }
}
