//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use devicehub_domain::error::DeviceHubError;
use devicehub_domain::event::Event;

use crate::ports::EventPublisher;

/// Fan-out of registry and service-call events to every subscriber.
///
/// Publishing never fails: with no subscriber the event is dropped, and a
/// subscriber that falls more than `capacity` events behind skips the
/// oldest ones (`RecvError::Lagged`).
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// Create a bus keeping at most `capacity` undelivered events per
    /// subscriber (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DeviceHubError>> + Send {
        let event_type = event.event_type;
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(?event_type, receivers, "event published"),
            Err(_) => tracing::trace!(?event_type, "event dropped, no subscriber"),
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicehub_domain::event::EventType;
    use devicehub_domain::id::EntityId;
    use tokio::sync::broadcast::error::RecvError;

    fn state_changed(to: &str) -> Event {
        Event::new(
            EventType::StateChanged,
            Some(EntityId::from_unique_id("warmup_home_bathroom")),
            serde_json::json!({"from": "auto", "to": to}),
        )
    }

    #[tokio::test]
    async fn should_deliver_transition_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(state_changed("heat")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, EventType::StateChanged);
        assert_eq!(received.data["to"], "heat");
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let event = Event::new(EventType::EntityRegistered, None, serde_json::json!({}));
        assert!(bus.publish(event).await.is_ok());
    }

    #[tokio::test]
    async fn should_report_lag_to_slow_subscriber() {
        let bus = InProcessEventBus::new(2);
        let mut rx = bus.subscribe();

        for to in ["heat", "off", "auto"] {
            bus.publish(state_changed(to)).await.unwrap();
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(rx.recv().await.unwrap().data["to"], "off");
    }

    #[tokio::test]
    async fn should_accept_zero_capacity() {
        let bus = InProcessEventBus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(state_changed("off")).await.unwrap();
        assert!(rx.recv().await.is_ok());
    }
}
