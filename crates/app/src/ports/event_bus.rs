//! Event bus port — publish/subscribe for domain events.

use std::future::Future;

use devicehub_domain::error::DeviceHubError;
use devicehub_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DeviceHubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DeviceHubError>> + Send {
        (**self).publish(event)
    }
}
