//! The single-writer session actor.
//!
//! One task owns the [`GameSession`]. Chat input reaches it through an mpsc
//! channel and every reply goes back through a oneshot, so commands and
//! phase timers are applied strictly one at a time. Between requests the
//! actor sleeps until the earliest pending phase timer.

use std::slice;
use std::sync::Arc;
use std::time::Duration;

use nightwatch_core::clock::Clock;
use nightwatch_core::error::DomainError;
use nightwatch_core::outbound::{MessageSink, OutboundMessage};
use nightwatch_core::player::PlayerId;
use nightwatch_core::rng::DeterministicRng;
use nightwatch_game::application::command_handlers::{self, GameCommandResult};
use nightwatch_game::application::query_handlers::{SessionView, get_session_view};
use nightwatch_game::domain::aggregates::GameSession;
use nightwatch_game::domain::commands::{
    CastVote, ConfigureRole, JoinGame, LeaveGame, RequestStart, SetPhaseDuration,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::delivery::{DeliveryReport, deliver_all};
use crate::parser::{self, ChatCommand};
use crate::render::Renderer;

/// A chat message from one player.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Who sent it.
    pub player: PlayerId,
    /// Raw message text.
    pub text: String,
}

/// What the actor did with an inbound message.
#[derive(Debug)]
pub enum Dispatch {
    /// Not a command; nothing happened.
    Ignored,
    /// The command ran. `replies` were handed to the sink in order.
    Handled {
        /// Everything rendered for the command.
        replies: Vec<OutboundMessage>,
        /// How delivery of `replies` went.
        delivery: DeliveryReport,
    },
    /// The command was refused and the session left untouched.
    Rejected {
        /// Why.
        error: DomainError,
        /// The rejection notice sent to the channel.
        reply: OutboundMessage,
    },
}

enum ActorRequest {
    Message {
        inbound: InboundMessage,
        reply: oneshot::Sender<Dispatch>,
    },
    Status {
        reply: oneshot::Sender<SessionView>,
    },
}

/// Cloneable handle for talking to a running [`SessionActor`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<ActorRequest>,
}

impl std::fmt::Debug for ActorRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message { inbound, .. } => f.debug_tuple("Message").field(inbound).finish(),
            Self::Status { .. } => f.write_str("Status"),
        }
    }
}

fn actor_gone() -> DomainError {
    DomainError::Infrastructure("session actor is not running".into())
}

impl SessionHandle {
    /// Sends a chat message to the session and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the actor has stopped.
    pub async fn submit(&self, inbound: InboundMessage) -> Result<Dispatch, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ActorRequest::Message { inbound, reply })
            .await
            .map_err(|_| actor_gone())?;
        rx.await.map_err(|_| actor_gone())
    }

    /// Reads the current session view.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the actor has stopped.
    pub async fn status(&self) -> Result<SessionView, DomainError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ActorRequest::Status { reply })
            .await
            .map_err(|_| actor_gone())?;
        rx.await.map_err(|_| actor_gone())
    }
}

/// Owns the session and its collaborators.
pub struct SessionActor {
    session: GameSession,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
    sink: Arc<dyn MessageSink>,
    renderer: Renderer,
    prefix: String,
}

impl SessionActor {
    /// Creates an actor for `session`; commands must start with `prefix`.
    #[must_use]
    pub fn new(
        session: GameSession,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
        sink: Arc<dyn MessageSink>,
        prefix: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        Self {
            session,
            clock,
            rng,
            sink,
            renderer: Renderer::new(prefix.clone()),
            prefix,
        }
    }

    /// Spawns the actor loop on the current runtime.
    ///
    /// The loop ends once every [`SessionHandle`] has been dropped.
    #[must_use]
    pub fn spawn(self, buffer: usize) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(self.run(rx));
        (SessionHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ActorRequest>) {
        info!(session_id = %self.session.id, "session actor started");
        loop {
            self.fire_due_timers().await;
            let wait = self
                .session
                .next_timer_due()
                .map(|due| (due - self.clock.now()).to_std().unwrap_or(Duration::ZERO));

            tokio::select! {
                request = rx.recv() => match request {
                    Some(ActorRequest::Message { inbound, reply }) => {
                        let dispatch = self.handle_message(inbound).await;
                        let _ = reply.send(dispatch);
                    }
                    Some(ActorRequest::Status { reply }) => {
                        self.fire_due_timers().await;
                        let _ = reply.send(self.view());
                    }
                    None => break,
                },
                () = sleep_for(wait) => {}
            }
        }
        info!(session_id = %self.session.id, "session actor stopped");
    }

    /// Parses, executes and delivers one chat message.
    ///
    /// Phase timers that are already due fire first, so a command always
    /// sees the phase the clock says it should.
    #[instrument(skip(self, inbound), fields(player = %inbound.player))]
    pub async fn handle_message(&mut self, inbound: InboundMessage) -> Dispatch {
        self.fire_due_timers().await;

        let outcome = match parser::parse(&self.prefix, &inbound.text) {
            Ok(None) => return Dispatch::Ignored,
            Ok(Some(command)) => self.execute(&inbound.player, command),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(replies) => {
                let delivery = deliver_all(self.sink.as_ref(), &replies).await;
                Dispatch::Handled { replies, delivery }
            }
            Err(error) => {
                debug!(error = %error, "command rejected");
                let reply = self.renderer.rejection(&inbound.player, &error);
                deliver_all(self.sink.as_ref(), slice::from_ref(&reply)).await;
                Dispatch::Rejected { error, reply }
            }
        }
    }

    /// Applies every phase transition that is due and delivers the
    /// announcements.
    pub async fn fire_due_timers(&mut self) -> DeliveryReport {
        let result = command_handlers::handle_due_timers(&mut self.session, self.clock.as_ref());
        if result.events.is_empty() {
            return DeliveryReport::default();
        }
        let messages = self.render(&result);
        deliver_all(self.sink.as_ref(), &messages).await
    }

    /// Current read-only view of the session.
    #[must_use]
    pub fn view(&self) -> SessionView {
        get_session_view(&self.session)
    }

    fn render(&self, result: &GameCommandResult) -> Vec<OutboundMessage> {
        result
            .events
            .iter()
            .map(|event| self.renderer.event(event))
            .collect()
    }

    fn execute(
        &mut self,
        player: &PlayerId,
        command: ChatCommand,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let clock = self.clock.as_ref();
        let session = &mut self.session;
        let correlation_id = Uuid::new_v4();
        let player = player.clone();
        let agree = command == ChatCommand::Agree;

        let result = match command {
            ChatCommand::Join => command_handlers::handle_join(
                &JoinGame {
                    correlation_id,
                    player,
                },
                session,
                clock,
            )?,
            ChatCommand::Leave => command_handlers::handle_leave(
                &LeaveGame {
                    correlation_id,
                    player,
                },
                session,
                clock,
            )?,
            ChatCommand::SetRole { role, count } => command_handlers::handle_configure_role(
                &ConfigureRole {
                    correlation_id,
                    role,
                    count,
                },
                session,
                clock,
            )?,
            ChatCommand::SetTime { phase, seconds } => {
                command_handlers::handle_set_phase_duration(
                    &SetPhaseDuration {
                        correlation_id,
                        phase,
                        seconds,
                    },
                    session,
                    clock,
                )?
            }
            ChatCommand::Start => command_handlers::handle_request_start(
                &RequestStart {
                    correlation_id,
                    requester: player,
                },
                session,
                clock,
            )?,
            ChatCommand::Agree | ChatCommand::Disagree => command_handlers::handle_cast_vote(
                &CastVote {
                    correlation_id,
                    player,
                    agree,
                },
                session,
                clock,
                self.rng.as_mut(),
            )?,
            ChatCommand::Status => return Ok(vec![self.renderer.status(&self.view())]),
            ChatCommand::Help => return Ok(vec![self.renderer.help()]),
        };

        Ok(self.render(&result))
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use nightwatch_core::outbound::Audience;
    use nightwatch_game::domain::phase_clock::{Phase, PhaseDurations};
    use nightwatch_test_support::{ManualClock, MockRng, RecordingSink};

    use super::*;

    struct Harness {
        actor: SessionActor,
        clock: Arc<ManualClock>,
        sink: Arc<RecordingSink>,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::default());
        let sink = Arc::new(RecordingSink::new());
        let actor = SessionActor::new(
            GameSession::new(Uuid::new_v4(), PhaseDurations::default()),
            clock.clone(),
            Box::new(MockRng),
            sink.clone(),
            "/",
        );
        Harness { actor, clock, sink }
    }

    fn msg(player: &str, text: &str) -> InboundMessage {
        InboundMessage {
            player: PlayerId::new(player),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn test_plain_chat_is_ignored() {
        let mut h = harness();

        let dispatch = h.actor.handle_message(msg("amy", "good morning")).await;

        assert!(matches!(dispatch, Dispatch::Ignored));
        assert!(h.sink.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_join_is_announced_to_the_channel() {
        // Arrange
        let mut h = harness();

        // Act
        let dispatch = h.actor.handle_message(msg("amy", "/join")).await;

        // Assert
        match dispatch {
            Dispatch::Handled { replies, delivery } => {
                assert_eq!(replies.len(), 1);
                assert_eq!(replies[0].kind, "game.player_joined");
                assert_eq!(delivery.delivered, 1);
            }
            other => panic!("expected Handled, got {other:?}"),
        }
        assert_eq!(h.actor.view().players, vec![PlayerId::new("amy")]);
    }

    #[tokio::test]
    async fn test_rejection_is_delivered_and_leaves_state_untouched() {
        // Arrange
        let mut h = harness();
        let before = h.actor.view().version;

        // Act
        let dispatch = h.actor.handle_message(msg("amy", "/agree")).await;

        // Assert
        assert!(matches!(
            dispatch,
            Dispatch::Rejected {
                error: DomainError::ProposalNotOpen,
                ..
            }
        ));
        assert_eq!(h.actor.view().version, before);
        assert_eq!(h.sink.delivered()[0].kind, "reply.rejected");
    }

    #[tokio::test]
    async fn test_due_timer_fires_before_next_command() {
        // Arrange
        let mut h = harness();
        for text in ["/setrole wolf 1", "/settime night 30"] {
            h.actor.handle_message(msg("amy", text)).await;
        }
        h.actor.handle_message(msg("amy", "/join")).await;
        h.actor.handle_message(msg("amy", "/start")).await;
        h.actor.handle_message(msg("amy", "/agree")).await;
        assert_eq!(h.actor.view().phase, Phase::Day);

        // Act
        h.clock.advance_secs(60);
        h.actor.handle_message(msg("amy", "/status")).await;

        // Assert
        let view = h.actor.view();
        assert_eq!(view.phase, Phase::Night);
        assert_eq!(view.cycle, 2);
        let delivered = h.sink.delivered();
        let direct = delivered
            .iter()
            .filter(|m| m.audience == Audience::Direct(PlayerId::new("amy")))
            .count();
        assert_eq!(direct, 1);
        assert!(
            delivered
                .iter()
                .any(|m| m.text == "⏳ **NIGHT phase started (30s)**")
        );
        assert_eq!(delivered.last().map(|m| m.kind.as_str()), Some("reply.status"));
    }

    #[tokio::test]
    async fn test_spawned_actor_answers_through_handle() {
        // Arrange
        let h = harness();
        let (handle, task) = h.actor.spawn(8);

        // Act
        let dispatch = handle.submit(msg("amy", "/join")).await.unwrap();
        let view = handle.status().await.unwrap();

        // Assert
        assert!(matches!(dispatch, Dispatch::Handled { .. }));
        assert_eq!(view.players.len(), 1);
        drop(handle);
        task.await.unwrap();
    }
}
