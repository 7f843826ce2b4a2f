//! Production `MessageSink`s: stdout for the console transport and a
//! bounded outbox that HTTP clients poll.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use nightwatch_core::error::DomainError;
use nightwatch_core::outbound::{Audience, MessageSink, OutboundMessage};
use serde::Serialize;
use tokio::io::{AsyncWriteExt, Stdout};

/// Writes messages to stdout as `[#channel] text` or `[dm @player] text`.
#[derive(Debug)]
pub struct ConsoleSink {
    out: tokio::sync::Mutex<Stdout>,
}

impl ConsoleSink {
    /// Creates a sink writing to the process's stdout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: tokio::sync::Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a message the way the console transport prints it.
#[must_use]
pub fn console_line(message: &OutboundMessage) -> String {
    match &message.audience {
        Audience::Channel => format!("[#channel] {}\n", message.text),
        Audience::Direct(player) => format!("[dm @{player}] {}\n", message.text),
    }
}

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        let line = console_line(message);
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))
    }
}

/// An outbox entry with its sequence number.
#[derive(Debug, Clone, Serialize)]
pub struct OutboxEntry {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    /// The delivered message.
    pub message: OutboundMessage,
}

#[derive(Debug, Default)]
struct Outbox {
    next_seq: u64,
    entries: VecDeque<OutboxEntry>,
}

/// Keeps the most recent `capacity` messages for a chat bridge to poll.
///
/// Older entries are dropped once the outbox is full; a bridge that falls
/// behind by more than `capacity` messages misses them.
#[derive(Debug)]
pub struct OutboxSink {
    capacity: usize,
    inner: Mutex<Outbox>,
}

impl OutboxSink {
    /// Creates an outbox holding at most `capacity` messages (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Outbox::default()),
        }
    }

    /// Entries with a sequence number greater than `seq`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the outbox lock is poisoned.
    pub fn after(&self, seq: u64) -> Result<Vec<OutboxEntry>, DomainError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| DomainError::Infrastructure("outbox lock poisoned".into()))?;
        Ok(inner
            .entries
            .iter()
            .filter(|entry| entry.seq > seq)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageSink for OutboxSink {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| DomainError::Infrastructure("outbox lock poisoned".into()))?;
        inner.next_seq += 1;
        let seq = inner.next_seq;
        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(OutboxEntry {
            seq,
            message: message.clone(),
        });
        Ok(())
    }
}
