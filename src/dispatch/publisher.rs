//! # Lifecycle Publisher
//!
//! Broadcast channel for dispatch lifecycle events. Observers subscribe to
//! follow dispatches (audit logs, admin panels, metrics shippers); the
//! dispatcher publishes fire-and-forget, so a missing or slow subscriber
//! never affects a dispatch.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// One lifecycle event emitted during a dispatch.
#[derive(Debug, Clone)]
pub struct LifecycleEvent {
    /// Event name, one of the `constants::events` names.
    pub name: String,
    /// Correlates all lifecycle events of one dispatch.
    pub dispatch_uuid: Uuid,
    /// Structured context: notification and event identifiers, error
    /// details on failure.
    pub context: Value,
    pub published_at: DateTime<Utc>,
}

/// Publisher for dispatch lifecycle events.
#[derive(Debug, Clone)]
pub struct LifecyclePublisher {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl LifecyclePublisher {
    /// Create a publisher with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a lifecycle event.
    ///
    /// Having no subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, name: impl Into<String>, dispatch_uuid: Uuid, context: Value) {
        let event = LifecycleEvent {
            name: name.into(),
            dispatch_uuid,
            context,
            published_at: Utc::now(),
        };

        // send() only fails when no receiver exists, which is fine here.
        let _ = self.sender.send(event);
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LifecyclePublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
