//! Outbound message abstraction.
//!
//! The game core emits structured events; the adapter renders them to
//! `OutboundMessage`s and hands them to a `MessageSink`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::player::PlayerId;

/// Who an outbound message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "player", rename_all = "snake_case")]
pub enum Audience {
    /// The session's group channel.
    Channel,
    /// A private message to a single player.
    Direct(PlayerId),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient of the message.
    pub audience: Audience,
    /// Event type (or reply kind) the message was rendered from.
    pub kind: String,
    /// Structured payload for adapters that render their own text.
    pub payload: serde_json::Value,
    /// Default human-readable rendering.
    pub text: String,
}

/// Delivers outbound messages to the chat platform.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver a single message.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotificationDeliveryFailed` for a direct
    /// message that could not be delivered, or `DomainError::Infrastructure`
    /// for channel-level failures.
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DomainError>;
}
