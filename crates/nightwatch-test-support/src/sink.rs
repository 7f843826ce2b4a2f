//! Test sinks - mock `MessageSink` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use nightwatch_core::error::DomainError;
use nightwatch_core::outbound::{Audience, MessageSink, OutboundMessage};
use nightwatch_core::player::PlayerId;

/// A sink that records every delivered message and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all delivered messages in delivery order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }

    /// Returns the texts of all delivered messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn texts(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A sink that fails direct messages to the configured players and records
/// everything else. With no players configured it fails every delivery.
#[derive(Debug, Default)]
pub struct FailingSink {
    unreachable: Vec<PlayerId>,
    delivered: Mutex<Vec<OutboundMessage>>,
}

impl FailingSink {
    /// A sink that rejects every message.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// A sink that rejects direct messages to `players` only.
    #[must_use]
    pub fn for_players(players: Vec<PlayerId>) -> Self {
        Self {
            unreachable: players,
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the messages that were accepted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for FailingSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        if self.unreachable.is_empty() {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        if let Audience::Direct(player) = &message.audience {
            if self.unreachable.contains(player) {
                return Err(DomainError::NotificationDeliveryFailed {
                    player: player.clone(),
                    reason: "direct messages disabled".into(),
                });
            }
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}
