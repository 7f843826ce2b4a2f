//! Command handlers for the game session context.
//!
//! Each handler runs one command against the session and hands back the
//! events it produced. The caller owns the session and must serialize calls;
//! the phase-timer callback ([`handle_due_timers`]) is just another such call.

use nightwatch_core::aggregate::AggregateRoot;
use nightwatch_core::clock::Clock;
use nightwatch_core::command::Command;
use nightwatch_core::error::DomainError;
use nightwatch_core::rng::DeterministicRng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::aggregates::GameSession;
use crate::domain::commands::{
    CastVote, ConfigureRole, JoinGame, LeaveGame, RequestStart, SetPhaseDuration,
};
use crate::domain::events::{GameEvent, GameEventKind};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct GameCommandResult {
    /// The session affected by the command.
    pub session_id: Uuid,
    /// The events produced, in order.
    pub events: Vec<GameEvent>,
}

fn take_events(session: &mut GameSession) -> GameCommandResult {
    let events = session.uncommitted_events().to_vec();
    session.clear_uncommitted_events();
    GameCommandResult {
        session_id: session.aggregate_id(),
        events,
    }
}

fn log_handled(command: &dyn Command, result: &GameCommandResult) {
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        events = result.events.len(),
        "command handled"
    );
}

/// Handles the `JoinGame` command.
///
/// # Errors
///
/// Returns `DomainError::CommandNotPermitted` if the phase policy refuses.
pub fn handle_join(
    command: &JoinGame,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<GameCommandResult, DomainError> {
    session.join(command.player.clone(), command.correlation_id, clock)?;
    let result = take_events(session);
    log_handled(command, &result);
    Ok(result)
}

/// Handles the `LeaveGame` command.
///
/// # Errors
///
/// Returns `DomainError::CommandNotPermitted` if the phase policy refuses.
pub fn handle_leave(
    command: &LeaveGame,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<GameCommandResult, DomainError> {
    session.leave(command.player.clone(), command.correlation_id, clock)?;
    let result = take_events(session);
    log_handled(command, &result);
    Ok(result)
}

/// Handles the `ConfigureRole` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for a blank role or negative count.
pub fn handle_configure_role(
    command: &ConfigureRole,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<GameCommandResult, DomainError> {
    session.set_role(
        command.role.clone(),
        command.count,
        command.correlation_id,
        clock,
    )?;
    let result = take_events(session);
    log_handled(command, &result);
    Ok(result)
}

/// Handles the `SetPhaseDuration` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` unless the length is positive.
pub fn handle_set_phase_duration(
    command: &SetPhaseDuration,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<GameCommandResult, DomainError> {
    session.set_time(
        command.phase,
        command.seconds,
        command.correlation_id,
        clock,
    )?;
    let result = take_events(session);
    log_handled(command, &result);
    Ok(result)
}

/// Handles the `RequestStart` command.
///
/// # Errors
///
/// Returns `DomainError::InsufficientPlayers` if the roster is smaller than
/// the role pool.
pub fn handle_request_start(
    command: &RequestStart,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<GameCommandResult, DomainError> {
    session.request_start(command.requester.clone(), command.correlation_id, clock)?;
    let result = take_events(session);
    log_handled(command, &result);
    Ok(result)
}

/// Handles the `CastVote` command; a passing vote deals roles and starts
/// the clock within the same call.
///
/// # Errors
///
/// Returns `DomainError::ProposalNotOpen` or `DomainError::NotEligible`.
pub fn handle_cast_vote(
    command: &CastVote,
    session: &mut GameSession,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
) -> Result<GameCommandResult, DomainError> {
    session.vote(
        command.player.clone(),
        command.agree,
        command.correlation_id,
        clock,
        rng,
    )?;
    let result = take_events(session);
    log_handled(command, &result);

    for event in &result.events {
        if let GameEventKind::ProposalPassed(payload) = &event.kind {
            info!(
                session_id = %result.session_id,
                votes = payload.votes,
                roster_size = payload.roster_size,
                game_started = payload.game_started,
                "start proposal passed"
            );
        }
    }
    Ok(result)
}

/// Fires every phase timer due on `clock` and returns the resulting events.
pub fn handle_due_timers(session: &mut GameSession, clock: &dyn Clock) -> GameCommandResult {
    let transitions = session.fire_due_timers(clock.now());
    let result = take_events(session);
    if transitions > 0 {
        info!(
            session_id = %result.session_id,
            transitions,
            phase = %session.phase(),
            "phase transition"
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use nightwatch_core::clock::Clock;
    use nightwatch_core::error::DomainError;
    use nightwatch_core::event::DomainEvent;
    use nightwatch_core::player::PlayerId;
    use nightwatch_test_support::{FixedClock, ManualClock, MockRng, fixed_instant};
    use uuid::Uuid;

    use crate::application::command_handlers::{
        handle_cast_vote, handle_configure_role, handle_due_timers, handle_join, handle_leave,
        handle_request_start, handle_set_phase_duration,
    };
    use crate::domain::aggregates::GameSession;
    use crate::domain::commands::{
        CastVote, ConfigureRole, JoinGame, LeaveGame, RequestStart, SetPhaseDuration,
    };
    use crate::domain::events::GameEventKind;
    use crate::domain::phase_clock::{Phase, PhaseDurations, PhaseKind};

    fn new_session() -> GameSession {
        GameSession::new(Uuid::new_v4(), PhaseDurations::default())
    }

    fn join(session: &mut GameSession, id: &str, clock: &dyn Clock) {
        handle_join(
            &JoinGame {
                correlation_id: Uuid::new_v4(),
                player: PlayerId::new(id),
            },
            session,
            clock,
        )
        .unwrap();
    }

    fn configure(session: &mut GameSession, role: &str, count: i64, clock: &dyn Clock) {
        handle_configure_role(
            &ConfigureRole {
                correlation_id: Uuid::new_v4(),
                role: role.to_owned(),
                count,
            },
            session,
            clock,
        )
        .unwrap();
    }

    fn agree(session: &mut GameSession, id: &str, clock: &dyn Clock) -> Vec<GameEventKind> {
        handle_cast_vote(
            &CastVote {
                correlation_id: Uuid::new_v4(),
                player: PlayerId::new(id),
                agree: true,
            },
            session,
            clock,
            &mut MockRng,
        )
        .unwrap()
        .events
        .into_iter()
        .map(|e| e.kind)
        .collect()
    }

    #[test]
    fn test_handle_join_returns_player_joined_event_with_metadata() {
        // Arrange
        let mut session = new_session();
        let clock = FixedClock(fixed_instant());
        let correlation_id = Uuid::new_v4();
        let command = JoinGame {
            correlation_id,
            player: PlayerId::new("alice"),
        };

        // Act
        let result = handle_join(&command, &mut session, &clock).unwrap();

        // Assert
        assert_eq!(result.session_id, session.id);
        assert_eq!(result.events.len(), 1);
        let event = &result.events[0];
        assert_eq!(event.event_type(), "game.player_joined");
        let meta = event.metadata();
        assert_eq!(meta.aggregate_id, session.id);
        assert_eq!(meta.sequence_number, 1);
        assert_eq!(meta.correlation_id, correlation_id);
        assert_eq!(meta.causation_id, correlation_id);
        assert_eq!(meta.occurred_at, fixed_instant());
        assert_eq!(event.to_payload()["PlayerJoined"]["player"], "alice");
    }

    #[test]
    fn test_handle_leave_returns_player_left_event() {
        // Arrange
        let mut session = new_session();
        let clock = FixedClock(fixed_instant());
        join(&mut session, "alice", &clock);

        // Act
        let result = handle_leave(
            &LeaveGame {
                correlation_id: Uuid::new_v4(),
                player: PlayerId::new("alice"),
            },
            &mut session,
            &clock,
        )
        .unwrap();

        // Assert
        assert_eq!(result.events[0].event_type(), "game.player_left");
        assert!(session.roster().is_empty());
    }

    #[test]
    fn test_handle_set_phase_duration_rejects_non_positive_seconds() {
        // Arrange
        let mut session = new_session();
        let clock = FixedClock(fixed_instant());
        let command = SetPhaseDuration {
            correlation_id: Uuid::new_v4(),
            phase: PhaseKind::Night,
            seconds: 0,
        };

        // Act
        let result = handle_set_phase_duration(&command, &mut session, &clock);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(session.durations(), PhaseDurations::default());
    }

    #[test]
    fn test_handle_request_start_returns_insufficient_players() {
        // Arrange
        let mut session = new_session();
        let clock = FixedClock(fixed_instant());
        configure(&mut session, "wolf", 1, &clock);

        // Act
        let result = handle_request_start(
            &RequestStart {
                correlation_id: Uuid::new_v4(),
                requester: PlayerId::new("alice"),
            },
            &mut session,
            &clock,
        );

        // Assert
        match result.unwrap_err() {
            DomainError::InsufficientPlayers { players, slots } => {
                assert_eq!((players, slots), (0, 1));
            }
            other => panic!("expected InsufficientPlayers, got {other:?}"),
        }
    }

    #[test]
    fn test_full_game_start_and_first_night() {
        // Arrange
        let clock = ManualClock::default();
        let mut session = new_session();
        configure(&mut session, "villager", 2, &clock);
        configure(&mut session, "wolf", 1, &clock);
        for id in ["A", "B", "C"] {
            join(&mut session, id, &clock);
        }
        handle_request_start(
            &RequestStart {
                correlation_id: Uuid::new_v4(),
                requester: PlayerId::new("A"),
            },
            &mut session,
            &clock,
        )
        .unwrap();

        // Act
        let first = agree(&mut session, "A", &clock);
        let second = agree(&mut session, "C", &clock);

        // Assert
        assert_eq!(first.len(), 1);
        assert!(matches!(
            second.last(),
            Some(GameEventKind::PhaseStarted(p)) if p.phase == PhaseKind::Day && p.seconds == 60
        ));
        let dealt = second
            .iter()
            .filter(|k| matches!(k, GameEventKind::RoleAssigned(_)))
            .count();
        assert_eq!(dealt, 3);

        clock.advance_secs(60);
        let result = handle_due_timers(&mut session, &clock);
        assert_eq!(result.events.len(), 1);
        assert_eq!(session.phase(), Phase::Night);
        assert_eq!(
            session.next_timer_due(),
            Some(fixed_instant() + Duration::seconds(120))
        );
    }

    #[test]
    fn test_handle_due_timers_before_start_returns_nothing() {
        let mut session = new_session();
        let clock = FixedClock(fixed_instant());

        let result = handle_due_timers(&mut session, &clock);

        assert!(result.events.is_empty());
    }
}
