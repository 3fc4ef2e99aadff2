//! # Dispatcher
//!
//! Drives one dispatch from trigger to delivery: gate on the notification's
//! active flag, construct the event, run it against the trigger payload,
//! resolve the processor and hand both over for delivery. Every dispatch
//! carries a UUID correlating its lifecycle events.
//!
//! ## Lifecycle
//!
//! - `notification.skipped` - the notification is inactive; nothing was
//!   constructed
//! - `notification.failed` - the processor reported a delivery failure
//! - `notification.dispatched` - the processor completed successfully
//!
//! Resolution failures (unknown types, missing capabilities) propagate as
//! typed errors before anything runs; no lifecycle event is published for
//! them because no dispatch ever started.

pub mod publisher;

pub use publisher::{LifecycleEvent, LifecyclePublisher};

use crate::constants::events as lifecycle;
use crate::error::Result;
use crate::event::{EventDefinition, EventFactory};
use crate::notification::{Notification, NotificationProcessorFactory};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The processor delivered the notification.
    Dispatched,
    /// The notification was inactive and skipped before anything ran.
    Skipped,
}

/// Record of one completed dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub dispatch_uuid: Uuid,
    /// Identifier of the dispatched notification.
    pub notification: String,
    /// Full identifier of the triggering event, `group.identifier`.
    pub event: String,
    pub outcome: DispatchOutcome,
    pub dispatched_at: DateTime<Utc>,
}

/// Orchestrates event construction, processor resolution and delivery.
pub struct Dispatcher {
    processors: Arc<NotificationProcessorFactory>,
    events: EventFactory,
    publisher: LifecyclePublisher,
}

impl Dispatcher {
    pub fn new(
        processors: Arc<NotificationProcessorFactory>,
        events: EventFactory,
        publisher: LifecyclePublisher,
    ) -> Self {
        Self {
            processors,
            events,
            publisher,
        }
    }

    /// Lifecycle publisher, for subscribing to dispatch events.
    pub fn publisher(&self) -> &LifecyclePublisher {
        &self.publisher
    }

    /// Dispatch one notification for a triggering event.
    ///
    /// Inactive notifications are skipped without constructing anything.
    /// Resolution errors propagate before delivery starts; delivery failures
    /// publish `notification.failed` and propagate.
    pub async fn dispatch(
        &self,
        definition: &EventDefinition,
        notification: Arc<dyn Notification>,
        payload: &Value,
    ) -> Result<DispatchReport> {
        let dispatch_uuid = Uuid::new_v4();
        let context = json!({
            "notification": notification.identifier(),
            "event": definition.full_identifier(),
        });

        if !notification.is_active() {
            debug!(
                notification = notification.identifier(),
                event = %definition.full_identifier(),
                "Skipping inactive notification"
            );
            self.publisher
                .publish(lifecycle::NOTIFICATION_SKIPPED, dispatch_uuid, context);

            return Ok(self.report(dispatch_uuid, definition, &notification, DispatchOutcome::Skipped));
        }

        let mut event = self.events.create(definition, notification.clone())?;
        event.run(payload)?;

        let processor = self.processors.from_notification(notification.as_ref())?;

        if let Err(failure) = processor
            .process(event.as_ref(), notification.as_ref())
            .await
        {
            error!(
                notification = notification.identifier(),
                event = %definition.full_identifier(),
                error = %failure,
                "Notification dispatch failed"
            );

            let mut failed_context = context;
            if let Some(map) = failed_context.as_object_mut() {
                map.insert("error".to_string(), Value::String(failure.to_string()));
            }
            self.publisher
                .publish(lifecycle::NOTIFICATION_FAILED, dispatch_uuid, failed_context);

            return Err(failure);
        }

        info!(
            notification = notification.identifier(),
            event = %definition.full_identifier(),
            dispatch_uuid = %dispatch_uuid,
            "Notification dispatched"
        );
        self.publisher
            .publish(lifecycle::NOTIFICATION_DISPATCHED, dispatch_uuid, context);

        Ok(self.report(dispatch_uuid, definition, &notification, DispatchOutcome::Dispatched))
    }

    /// Dispatch every listening notification for one triggering event,
    /// concurrently. Each dispatch fails or succeeds on its own.
    pub async fn dispatch_all(
        &self,
        definition: &EventDefinition,
        notifications: Vec<Arc<dyn Notification>>,
        payload: &Value,
    ) -> Vec<Result<DispatchReport>> {
        join_all(
            notifications
                .into_iter()
                .map(|notification| self.dispatch(definition, notification, payload)),
        )
        .await
    }

    fn report(
        &self,
        dispatch_uuid: Uuid,
        definition: &EventDefinition,
        notification: &Arc<dyn Notification>,
        outcome: DispatchOutcome,
    ) -> DispatchReport {
        DispatchReport {
            dispatch_uuid,
            notification: notification.identifier().to_string(),
            event: definition.full_identifier(),
            outcome,
            dispatched_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("processors", &self.processors)
            .field("subscriber_count", &self.publisher.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::types;
    use crate::error::{NotizError, ResolutionError};
    use crate::event::Event;
    use crate::notification::NotificationProcessor;
    use crate::registry::{
        Capability, ClassRegistry, OverrideAliasTable, TypeIdentifier, TypeRecord, TypeRegistry,
    };
    use std::collections::HashMap;

    #[derive(Debug)]
    struct TestNotification {
        type_identifier: TypeIdentifier,
        identifier: String,
        active: bool,
    }

    impl Notification for TestNotification {
        fn type_identifier(&self) -> &TypeIdentifier {
            &self.type_identifier
        }

        fn identifier(&self) -> &str {
            &self.identifier
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    #[derive(Debug)]
    struct TestEvent {
        definition: EventDefinition,
        notification: Arc<dyn Notification>,
        values: HashMap<String, Value>,
    }

    impl Event for TestEvent {
        fn definition(&self) -> &EventDefinition {
            &self.definition
        }

        fn notification(&self) -> &Arc<dyn Notification> {
            &self.notification
        }

        fn run(&mut self, payload: &Value) -> Result<()> {
            self.values
                .insert("payload".to_string(), payload.clone());
            Ok(())
        }

        fn property_values(&self) -> HashMap<String, Value> {
            self.values.clone()
        }
    }

    #[derive(Debug)]
    struct TestProcessor {
        notification_type: TypeIdentifier,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl NotificationProcessor for TestProcessor {
        fn notification_type(&self) -> &TypeIdentifier {
            &self.notification_type
        }

        async fn process(
            &self,
            _event: &dyn Event,
            _notification: &dyn Notification,
        ) -> Result<()> {
            if self.fail {
                Err(NotizError::dispatch("smtp connection refused"))
            } else {
                Ok(())
            }
        }
    }

    fn dispatcher() -> Dispatcher {
        let registry = Arc::new(TypeRegistry::with_builtins());

        registry
            .register(
                TypeRecord::builder("acme.mail-processor")
                    .supertype(types::PROCESSOR_BASE)
                    .processor_constructor(|notification_type| {
                        Arc::new(TestProcessor {
                            notification_type,
                            fail: false,
                        })
                    })
                    .build(),
            )
            .unwrap();

        registry
            .register(
                TypeRecord::builder("acme.broken-processor")
                    .supertype(types::PROCESSOR_BASE)
                    .processor_constructor(|notification_type| {
                        Arc::new(TestProcessor {
                            notification_type,
                            fail: true,
                        })
                    })
                    .build(),
            )
            .unwrap();

        registry
            .register(
                TypeRecord::builder("acme.mail")
                    .capability(Capability::Notification)
                    .processor_type("acme.mail-processor")
                    .build(),
            )
            .unwrap();

        registry
            .register(
                TypeRecord::builder("acme.flaky-mail")
                    .capability(Capability::Notification)
                    .processor_type("acme.broken-processor")
                    .build(),
            )
            .unwrap();

        registry
            .register(
                TypeRecord::builder("acme.event")
                    .event_constructor(|definition, notification| {
                        Box::new(TestEvent {
                            definition,
                            notification,
                            values: HashMap::new(),
                        })
                    })
                    .build(),
            )
            .unwrap();

        let registry = ClassRegistry::new(registry);
        let aliases = Arc::new(OverrideAliasTable::new());
        let processors = Arc::new(NotificationProcessorFactory::new(
            registry.clone(),
            aliases,
        ));

        Dispatcher::new(
            processors,
            EventFactory::new(registry),
            LifecyclePublisher::default(),
        )
    }

    fn event_definition(event_type: &str) -> EventDefinition {
        EventDefinition {
            group: "system".to_string(),
            identifier: "something-happened".to_string(),
            label: String::new(),
            description: String::new(),
            event_type: event_type.into(),
        }
    }

    fn notification(notification_type: &str, active: bool) -> Arc<dyn Notification> {
        Arc::new(TestNotification {
            type_identifier: notification_type.into(),
            identifier: "mail-to-admin".to_string(),
            active,
        })
    }

    #[tokio::test]
    async fn successful_dispatch_publishes_lifecycle_event() {
        let dispatcher = dispatcher();
        let mut receiver = dispatcher.publisher().subscribe();

        let report = dispatcher
            .dispatch(
                &event_definition("acme.event"),
                notification("acme.mail", true),
                &json!({"user": "admin"}),
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, DispatchOutcome::Dispatched);
        assert_eq!(report.notification, "mail-to-admin");
        assert_eq!(report.event, "system.something-happened");

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.name, lifecycle::NOTIFICATION_DISPATCHED);
        assert_eq!(event.dispatch_uuid, report.dispatch_uuid);
    }

    #[tokio::test]
    async fn inactive_notifications_are_skipped_without_construction() {
        let dispatcher = dispatcher();
        let mut receiver = dispatcher.publisher().subscribe();

        let report = dispatcher
            .dispatch(
                &event_definition("acme.event"),
                notification("acme.mail", false),
                &Value::Null,
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, DispatchOutcome::Skipped);
        assert_eq!(
            receiver.try_recv().unwrap().name,
            lifecycle::NOTIFICATION_SKIPPED
        );
        // The skip happened before any resolution.
        assert_eq!(dispatcher.processors.cached_processors(), 0);
    }

    #[tokio::test]
    async fn delivery_failure_publishes_failed_and_propagates() {
        let dispatcher = dispatcher();
        let mut receiver = dispatcher.publisher().subscribe();

        let result = dispatcher
            .dispatch(
                &event_definition("acme.event"),
                notification("acme.flaky-mail", true),
                &Value::Null,
            )
            .await;

        assert!(matches!(result, Err(NotizError::Dispatch { .. })));

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.name, lifecycle::NOTIFICATION_FAILED);
        assert_eq!(
            event.context["error"],
            json!("dispatch error: smtp connection refused")
        );
    }

    #[tokio::test]
    async fn resolution_failure_publishes_no_lifecycle_event() {
        let dispatcher = dispatcher();
        let mut receiver = dispatcher.publisher().subscribe();

        let result = dispatcher
            .dispatch(
                &event_definition("acme.unregistered-event"),
                notification("acme.mail", true),
                &Value::Null,
            )
            .await;

        match result {
            Err(NotizError::Resolution(error)) => {
                assert_eq!(error, ResolutionError::type_not_found("acme.unregistered-event"));
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn dispatch_runs_on_a_spawned_task() {
        // Hosts run dispatches on worker tasks; the dispatch future must be
        // Send even while it holds the event across the process await.
        let dispatcher = Arc::new(dispatcher());
        let definition = event_definition("acme.event");
        let mail = notification("acme.mail", true);

        let handle = tokio::spawn(async move {
            dispatcher
                .dispatch(&definition, mail, &json!({"user": "admin"}))
                .await
        });

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.outcome, DispatchOutcome::Dispatched);
    }

    #[tokio::test]
    async fn dispatch_all_isolates_failures() {
        let dispatcher = dispatcher();

        let results = dispatcher
            .dispatch_all(
                &event_definition("acme.event"),
                vec![
                    notification("acme.mail", true),
                    notification("acme.flaky-mail", true),
                    notification("acme.mail", false),
                ],
                &Value::Null,
            )
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap().outcome,
            DispatchOutcome::Dispatched
        );
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap().outcome,
            DispatchOutcome::Skipped
        );
    }
}
