//! # Event Factory
//!
//! Constructs event instances bound to an event definition and a
//! notification. Resolution is validated through the class registry; a
//! fresh instance is built on every call because events are stateful
//! one-shot run contexts.

use super::{Event, EventDefinition};
use crate::error::ResolutionError;
use crate::notification::Notification;
use crate::registry::{Capability, ClassRegistry};
use std::sync::Arc;
use tracing::debug;

/// Factory producing event instances for dispatch runs.
#[derive(Debug, Clone)]
pub struct EventFactory {
    registry: ClassRegistry,
}

impl EventFactory {
    pub fn new(registry: ClassRegistry) -> Self {
        Self { registry }
    }

    /// Create an event for the definition, bound to the notification.
    ///
    /// Fails with `TypeNotFound` when the definition's event type is not
    /// registered and with `InvalidType` when the registered type does not
    /// provide the `Event` capability. Nothing is constructed on failure.
    pub fn create(
        &self,
        definition: &EventDefinition,
        notification: Arc<dyn Notification>,
    ) -> Result<Box<dyn Event>, ResolutionError> {
        let resolved = self
            .registry
            .resolve(&definition.event_type, Capability::Event)
            .map_err(ResolutionError::from)?;

        let constructor = resolved.event_constructor().ok_or_else(|| {
            ResolutionError::constructor_mismatch(resolved.identifier().clone(), "Event")
        })?;

        debug!(
            event = %definition.full_identifier(),
            event_type = %definition.event_type,
            notification = notification.identifier(),
            "Creating event instance"
        );

        Ok(constructor(definition.clone(), notification))
    }
}
