//! Aggregate root for the game session context.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use nightwatch_core::aggregate::AggregateRoot;
use nightwatch_core::clock::Clock;
use nightwatch_core::error::DomainError;
use nightwatch_core::event::EventMetadata;
use nightwatch_core::player::PlayerId;
use nightwatch_core::rng::DeterministicRng;
use nightwatch_core::timer::TimerQueue;
use tracing::debug;
use uuid::Uuid;

use super::events::{
    GameEvent, GameEventKind, PhaseDurationSet, PhaseStarted, PlayerJoined, PlayerLeft,
    ProposalPassed, RoleAssigned, RoleConfigured, StartProposed, VoteCast, VoteDeclined,
};
use super::phase_clock::{Phase, PhaseClock, PhaseDurations, PhaseKind, PhaseTimer};
use super::policy::{CommandKind, ensure_permitted};
use super::role_assigner::{self, RoleAssignment};
use super::role_config::RoleConfig;
use super::vote_gate::VoteGate;

/// The single game session: roster, role pool, start vote and phase clock.
///
/// State only changes through [`AggregateRoot::apply`]; every public
/// operation validates first and then raises events, so a rejected command
/// leaves the session untouched.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) roster: BTreeSet<PlayerId>,
    pub(crate) roles: RoleConfig,
    pub(crate) vote_gate: VoteGate,
    pub(crate) durations: PhaseDurations,
    pub(crate) clock: PhaseClock,
    /// Set once, when the first proposal passes.
    pub(crate) assignment: Option<RoleAssignment>,
    timers: TimerQueue<PhaseTimer>,
    /// Uncommitted events pending hand-off to the adapter.
    uncommitted_events: Vec<GameEvent>,
}

impl GameSession {
    /// Creates a session in the `waiting` phase.
    #[must_use]
    pub fn new(id: Uuid, durations: PhaseDurations) -> Self {
        Self {
            id,
            version: 0,
            roster: BTreeSet::new(),
            roles: RoleConfig::new(),
            vote_gate: VoteGate::new(),
            durations,
            clock: PhaseClock::new(),
            assignment: None,
            timers: TimerQueue::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Current roster.
    #[must_use]
    pub fn roster(&self) -> &BTreeSet<PlayerId> {
        &self.roster
    }

    /// Current role configuration.
    #[must_use]
    pub fn role_config(&self) -> &RoleConfig {
        &self.roles
    }

    /// Start-vote state.
    #[must_use]
    pub fn vote_gate(&self) -> &VoteGate {
        &self.vote_gate
    }

    /// Configured phase lengths.
    #[must_use]
    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// The day/night clock.
    #[must_use]
    pub fn phase_clock(&self) -> &PhaseClock {
        &self.clock
    }

    /// Coarse phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    /// Roles dealt when the game started.
    #[must_use]
    pub fn assignment(&self) -> Option<&RoleAssignment> {
        self.assignment.as_ref()
    }

    /// When the next phase transition is due.
    #[must_use]
    pub fn next_timer_due(&self) -> Option<DateTime<Utc>> {
        self.timers.next_due()
    }

    fn raise(&mut self, kind: GameEventKind, correlation_id: Uuid, occurred_at: DateTime<Utc>) {
        let event = GameEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.version + 1,
                correlation_id,
                causation_id: correlation_id,
                occurred_at,
            },
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Adds `player` to the roster. Joining twice is a no-op on the roster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CommandNotPermitted` if the phase policy refuses.
    pub fn join(
        &mut self,
        player: PlayerId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_permitted(CommandKind::Join, self.phase())?;
        let roster_size = self.roster.len() + usize::from(!self.roster.contains(&player));
        self.raise(
            GameEventKind::PlayerJoined(PlayerJoined {
                player,
                roster_size,
            }),
            correlation_id,
            clock.now(),
        );
        Ok(())
    }

    /// Removes `player` from the roster and withdraws any pending vote.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CommandNotPermitted` if the phase policy refuses.
    pub fn leave(
        &mut self,
        player: PlayerId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_permitted(CommandKind::Leave, self.phase())?;
        let roster_size = self.roster.len() - usize::from(self.roster.contains(&player));
        self.raise(
            GameEventKind::PlayerLeft(PlayerLeft {
                player,
                roster_size,
            }),
            correlation_id,
            clock.now(),
        );
        Ok(())
    }

    /// Sets the slot count of `role`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a blank role or a negative
    /// count.
    pub fn set_role(
        &mut self,
        role: String,
        count: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_permitted(CommandKind::SetRole, self.phase())?;
        let count = RoleConfig::validate(&role, count)?;
        let previous = self.roles.count(&role).unwrap_or(0) as usize;
        let total_slots = self.roles.total_slots() - previous + count as usize;
        self.raise(
            GameEventKind::RoleConfigured(RoleConfigured {
                role,
                count,
                total_slots,
            }),
            correlation_id,
            clock.now(),
        );
        Ok(())
    }

    /// Sets the length of future `phase` phases; a running phase keeps the
    /// length it was entered with.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` unless `seconds` is positive.
    pub fn set_time(
        &mut self,
        phase: PhaseKind,
        seconds: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_permitted(CommandKind::SetTime, self.phase())?;
        let seconds = PhaseDurations::validate(seconds)?;
        self.raise(
            GameEventKind::PhaseDurationSet(PhaseDurationSet { phase, seconds }),
            correlation_id,
            clock.now(),
        );
        Ok(())
    }

    /// Opens a start proposal, discarding any earlier votes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InsufficientPlayers` if fewer players have
    /// joined than there are role slots.
    pub fn request_start(
        &mut self,
        requester: PlayerId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        ensure_permitted(CommandKind::RequestStart, self.phase())?;
        let players = self.roster.len();
        let slots = self.roles.total_slots();
        if players < slots {
            return Err(DomainError::InsufficientPlayers { players, slots });
        }
        self.raise(
            GameEventKind::StartProposed(StartProposed {
                requester,
                required_votes: VoteGate::required_votes(players),
            }),
            correlation_id,
            clock.now(),
        );
        Ok(())
    }

    /// Records a vote on the open proposal. When an affirmative vote forms a
    /// majority of the current roster, the proposal passes: roles are dealt
    /// and the clock starts at day.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotOpen` without an open proposal,
    /// `DomainError::NotEligible` for an affirmative vote from a player who
    /// has not joined, and `DomainError::InsufficientPlayers` when the vote
    /// would start a game with fewer players than role slots. In that case
    /// the vote is not recorded and the proposal stays open.
    pub fn vote(
        &mut self,
        player: PlayerId,
        agree: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<(), DomainError> {
        ensure_permitted(CommandKind::Vote, self.phase())?;
        let now = clock.now();

        if !agree {
            if !self.vote_gate.is_open() {
                return Err(DomainError::ProposalNotOpen);
            }
            self.raise(
                GameEventKind::VoteDeclined(VoteDeclined { player }),
                correlation_id,
                now,
            );
            return Ok(());
        }

        self.vote_gate.ensure_can_vote(&player, &self.roster)?;
        let votes =
            self.vote_gate.votes().len() + usize::from(!self.vote_gate.votes().contains(&player));
        let players = self.roster.len();
        let slots = self.roles.total_slots();
        if votes >= VoteGate::required_votes(players) && !self.clock.is_running() && players < slots
        {
            // Roster or roles changed after the proposal opened.
            return Err(DomainError::InsufficientPlayers { players, slots });
        }
        self.raise(
            GameEventKind::VoteCast(VoteCast {
                player,
                votes,
                required_votes: VoteGate::required_votes(self.roster.len()),
            }),
            correlation_id,
            now,
        );

        if self.vote_gate.has_majority(self.roster.len()) {
            self.pass_proposal(correlation_id, now, rng);
        }
        Ok(())
    }

    fn pass_proposal(
        &mut self,
        correlation_id: Uuid,
        now: DateTime<Utc>,
        rng: &mut dyn DeterministicRng,
    ) {
        let game_started = !self.clock.is_running();
        self.raise(
            GameEventKind::ProposalPassed(ProposalPassed {
                votes: self.vote_gate.votes().len(),
                roster_size: self.roster.len(),
                game_started,
            }),
            correlation_id,
            now,
        );
        if !game_started {
            debug!(session_id = %self.id, "proposal passed while a game is running; nothing restarted");
            return;
        }

        for (player, role) in role_assigner::assign(&self.roster, &self.roles, rng) {
            self.raise(
                GameEventKind::RoleAssigned(RoleAssigned { player, role }),
                correlation_id,
                now,
            );
        }

        self.enter_next_phase(correlation_id, now);
    }

    fn enter_next_phase(&mut self, correlation_id: Uuid, at: DateTime<Utc>) {
        let (phase, cycle) = self.clock.next();
        let seconds = self.durations.get(phase);
        self.raise(
            GameEventKind::PhaseStarted(PhaseStarted {
                phase,
                seconds,
                cycle,
            }),
            correlation_id,
            at,
        );
        if let Some(running) = self.clock.running() {
            self.timers.schedule_at(
                running.ends_at(),
                PhaseTimer {
                    session_id: self.id,
                    cycle,
                },
            );
        }
    }

    /// Runs every phase transition due at `now`.
    ///
    /// Each new phase is entered at the instant the previous one ended, so a
    /// late wake-up does not stretch the cycle. Stale timers are dropped.
    /// Returns the number of transitions made.
    pub fn fire_due_timers(&mut self, now: DateTime<Utc>) -> usize {
        let mut transitions = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            if !self.clock.is_current(self.id, &timer) {
                debug!(session_id = %self.id, cycle = timer.cycle, "dropping stale phase timer");
                continue;
            }
            let Some(ended_at) = self.clock.running().map(|r| r.ends_at()) else {
                continue;
            };
            self.enter_next_phase(Uuid::new_v4(), ended_at);
            transitions += 1;
        }
        transitions
    }

    #[cfg(test)]
    pub(crate) fn schedule_timer(&mut self, due_at: DateTime<Utc>, timer: PhaseTimer) {
        self.timers.schedule_at(due_at, timer);
    }
}

impl AggregateRoot for GameSession {
    type Event = GameEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            GameEventKind::PlayerJoined(payload) => {
                self.roster.insert(payload.player.clone());
            }
            GameEventKind::PlayerLeft(payload) => {
                self.roster.remove(&payload.player);
                self.vote_gate.withdraw(&payload.player);
            }
            GameEventKind::RoleConfigured(payload) => {
                self.roles.insert(payload.role.clone(), payload.count);
            }
            GameEventKind::PhaseDurationSet(payload) => {
                self.durations.set(payload.phase, payload.seconds);
            }
            GameEventKind::StartProposed(_) => self.vote_gate.open_proposal(),
            GameEventKind::VoteCast(payload) => self.vote_gate.record(payload.player.clone()),
            GameEventKind::VoteDeclined(_) => {}
            GameEventKind::ProposalPassed(payload) => {
                self.vote_gate.close();
                if payload.game_started {
                    self.assignment = Some(RoleAssignment::default());
                }
            }
            GameEventKind::RoleAssigned(payload) => {
                self.assignment
                    .get_or_insert_with(RoleAssignment::default)
                    .insert(payload.player.clone(), payload.role.clone());
            }
            GameEventKind::PhaseStarted(payload) => {
                self.clock.enter(
                    payload.phase,
                    payload.seconds,
                    event.metadata.occurred_at,
                    payload.cycle,
                );
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
