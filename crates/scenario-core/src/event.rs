use crate::types::ResolutionEvent;

/// Event bus using tokio broadcast channel.
/// All subscribers receive all events.
pub struct EventBus {
    tx: tokio::sync::broadcast::Sender<ResolutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: ResolutionEvent) {
        // Ignore error if no receivers
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ResolutionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolutionId;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(ResolutionEvent::Validated {
            id: ResolutionId::from_str("r1"),
            errors: 0,
            warnings: 1,
            at: chrono::Utc::now(),
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ResolutionEvent::Validated { warnings: 1, .. }));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        bus.publish(ResolutionEvent::CycleDetected {
            id: ResolutionId::new(),
            node: "x".into(),
            at: chrono::Utc::now(),
        });
    }
}
