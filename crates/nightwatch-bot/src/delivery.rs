//! Sequential delivery with per-recipient failure isolation.

use nightwatch_core::error::DomainError;
use nightwatch_core::outbound::{Audience, MessageSink, OutboundMessage};
use tracing::warn;

/// Outcome of delivering a batch of messages.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Number of messages the sink accepted.
    pub delivered: usize,
    /// One entry per message the sink refused, in delivery order.
    pub failures: Vec<DomainError>,
}

impl DeliveryReport {
    /// Whether every message was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delivers `messages` in order. A refused message is logged and recorded;
/// the remaining messages are still attempted.
pub async fn deliver_all(sink: &dyn MessageSink, messages: &[OutboundMessage]) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for message in messages {
        match sink.deliver(message).await {
            Ok(()) => report.delivered += 1,
            Err(err) => {
                let err = match (&message.audience, err) {
                    (_, err @ DomainError::NotificationDeliveryFailed { .. }) => err,
                    (Audience::Direct(player), other) => DomainError::NotificationDeliveryFailed {
                        player: player.clone(),
                        reason: other.to_string(),
                    },
                    (Audience::Channel, other) => other,
                };
                warn!(kind = %message.kind, error = %err, "message delivery failed");
                report.failures.push(err);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use nightwatch_core::player::PlayerId;
    use nightwatch_test_support::{FailingSink, RecordingSink};
    use serde_json::Value;

    use super::*;

    fn message(audience: Audience, text: &str) -> OutboundMessage {
        OutboundMessage {
            audience,
            kind: "test".into(),
            payload: Value::Null,
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn test_deliver_all_sends_in_order() {
        // Arrange
        let sink = RecordingSink::new();
        let batch = vec![
            message(Audience::Channel, "one"),
            message(Audience::Direct(PlayerId::new("amy")), "two"),
        ];

        // Act
        let report = deliver_all(&sink, &batch).await;

        // Assert
        assert_eq!(report.delivered, 2);
        assert!(report.is_clean());
        assert_eq!(sink.texts(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_failed_direct_message_does_not_stop_the_rest() {
        // Arrange
        let sink = FailingSink::for_players(vec![PlayerId::new("bob")]);
        let batch = vec![
            message(Audience::Direct(PlayerId::new("amy")), "a"),
            message(Audience::Direct(PlayerId::new("bob")), "b"),
            message(Audience::Direct(PlayerId::new("cat")), "c"),
            message(Audience::Channel, "day"),
        ];

        // Act
        let report = deliver_all(&sink, &batch).await;

        // Assert
        assert_eq!(report.delivered, 3);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            DomainError::NotificationDeliveryFailed { player, .. } if player.as_str() == "bob"
        ));
        let texts: Vec<String> = sink.delivered().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["a", "c", "day"]);
    }

    #[tokio::test]
    async fn test_transport_failure_on_direct_message_is_reported_per_player() {
        // Arrange
        let sink = FailingSink::always();
        let batch = vec![
            message(Audience::Direct(PlayerId::new("amy")), "a"),
            message(Audience::Channel, "b"),
        ];

        // Act
        let report = deliver_all(&sink, &batch).await;

        // Assert
        assert_eq!(report.delivered, 0);
        assert!(matches!(
            report.failures[0],
            DomainError::NotificationDeliveryFailed { .. }
        ));
        assert!(matches!(report.failures[1], DomainError::Infrastructure(_)));
    }
}
