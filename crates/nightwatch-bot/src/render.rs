//! Turns game events and replies into chat text.

use std::fmt::Write as _;

use nightwatch_core::error::DomainError;
use nightwatch_core::event::DomainEvent;
use nightwatch_core::outbound::{Audience, OutboundMessage};
use nightwatch_core::player::PlayerId;
use nightwatch_game::application::query_handlers::SessionView;
use nightwatch_game::domain::events::{GameEvent, GameEventKind};
use serde_json::json;

/// Reply kind for a refused command.
pub const REJECTED_REPLY_KIND: &str = "reply.rejected";

/// Reply kind for the `status` command.
pub const STATUS_REPLY_KIND: &str = "reply.status";

/// Reply kind for the `help` command.
pub const HELP_REPLY_KIND: &str = "reply.help";

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.join(", ")
    }
}

/// Renders outbound messages for one command prefix.
#[derive(Debug, Clone)]
pub struct Renderer {
    prefix: String,
}

impl Renderer {
    /// Creates a renderer whose replies mention `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Renders a game event for its audience.
    #[must_use]
    pub fn event(&self, event: &GameEvent) -> OutboundMessage {
        let p = &self.prefix;
        let text = match &event.kind {
            GameEventKind::PlayerJoined(e) => {
                format!("✅ {} joined the game ({} players)", e.player, e.roster_size)
            }
            GameEventKind::PlayerLeft(e) => {
                format!("🚪 {} left the game ({} players)", e.player, e.roster_size)
            }
            GameEventKind::RoleConfigured(e) => format!(
                "🧩 Role set: {} × {} ({} slots total)",
                e.role, e.count, e.total_slots
            ),
            GameEventKind::PhaseDurationSet(e) => {
                format!("⏱ {} phase length set to {}s", e.phase, e.seconds)
            }
            GameEventKind::StartProposed(e) => format!(
                "⚠️ {} wants to start the game. Reply {p}agree or {p}disagree ({} votes needed)",
                e.requester, e.required_votes
            ),
            GameEventKind::VoteCast(e) => format!(
                "🗳 {} agreed ({}/{})",
                e.player, e.votes, e.required_votes
            ),
            GameEventKind::VoteDeclined(e) => format!("❌ {} disagreed", e.player),
            GameEventKind::ProposalPassed(e) if e.game_started => format!(
                "🎉 Majority reached ({}/{}). Roles are being dealt!",
                e.votes, e.roster_size
            ),
            GameEventKind::ProposalPassed(e) => format!(
                "🎉 Majority reached ({}/{}), but the game is already running",
                e.votes, e.roster_size
            ),
            GameEventKind::RoleAssigned(e) => format!("🃏 Your role is **{}**", e.role),
            GameEventKind::PhaseStarted(e) => format!(
                "⏳ **{} phase started ({}s)**",
                e.phase.to_string().to_uppercase(),
                e.seconds
            ),
        };

        OutboundMessage {
            audience: event.kind.audience(),
            kind: event.event_type().to_owned(),
            payload: event.to_payload(),
            text,
        }
    }

    /// Renders a refused command back to the channel.
    #[must_use]
    pub fn rejection(&self, player: &PlayerId, err: &DomainError) -> OutboundMessage {
        let p = &self.prefix;
        let text = match err {
            DomainError::InvalidArgument(msg) => format!("❗ {player}: {msg}"),
            DomainError::InsufficientPlayers { players, slots } => format!(
                "❗ Not enough players: {players} joined but {slots} roles are configured"
            ),
            DomainError::ProposalNotOpen => {
                format!("❗ There is no start proposal. Use {p}start first")
            }
            DomainError::NotEligible(who) => {
                format!("❗ {who}: join the game ({p}join) before voting")
            }
            other => format!("❗ {player}: {other}"),
        };

        OutboundMessage {
            audience: Audience::Channel,
            kind: REJECTED_REPLY_KIND.to_owned(),
            payload: json!({
                "player": player,
                "error": err.code(),
                "message": err.to_string(),
            }),
            text,
        }
    }

    /// Renders the `status` reply.
    #[must_use]
    pub fn status(&self, view: &SessionView) -> OutboundMessage {
        let mut text = format!("📋 Phase: {}", view.phase);
        if view.cycle > 0 {
            let _ = write!(text, " (cycle {})", view.cycle);
        }

        let players: Vec<String> = view.players.iter().map(ToString::to_string).collect();
        let _ = write!(
            text,
            "\nPlayers ({}): {}",
            players.len(),
            list_or_none(&players)
        );

        let roles: Vec<String> = view
            .roles
            .iter()
            .map(|(name, count)| format!("{name} × {count}"))
            .collect();
        let _ = write!(
            text,
            "\nRoles ({} slots): {}",
            view.total_slots,
            list_or_none(&roles)
        );

        let _ = write!(
            text,
            "\nDay {}s / Night {}s",
            view.durations.day_seconds, view.durations.night_seconds
        );
        if view.proposal_open {
            let _ = write!(text, "\nStart proposal open: {} votes", view.votes.len());
        }

        OutboundMessage {
            audience: Audience::Channel,
            kind: STATUS_REPLY_KIND.to_owned(),
            payload: json!(view),
            text,
        }
    }

    /// Renders the `help` reply.
    #[must_use]
    pub fn help(&self) -> OutboundMessage {
        let p = &self.prefix;
        let text = format!(
            "Commands:\n\
             {p}join | {p}leave\n\
             {p}setrole <role> <count>\n\
             {p}settime day|night <seconds>\n\
             {p}start, then {p}agree or {p}disagree\n\
             {p}status | {p}help"
        );

        OutboundMessage {
            audience: Audience::Channel,
            kind: HELP_REPLY_KIND.to_owned(),
            payload: json!({ "prefix": p }),
            text,
        }
    }
}
