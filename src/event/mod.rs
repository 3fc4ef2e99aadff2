//! # Events
//!
//! An event is the triggering occurrence a notification reacts to: an
//! extension being installed, a scheduled task finishing, a comment being
//! added. Event *definitions* are declarative and live in the definition
//! tree, grouped by event group; event *instances* are stateful one-shot run
//! contexts constructed per dispatch by the [`EventFactory`].

pub mod factory;

pub use factory::EventFactory;

use crate::error::Result;
use crate::notification::Notification;
use crate::registry::TypeIdentifier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Declarative description of one event inside an event group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Identifier of the owning event group; forced from the tree structure
    /// during the build pass.
    #[serde(default)]
    pub group: String,

    /// Event identifier, unique within its group; forced from the map key
    /// during the build pass.
    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,

    /// Registry identifier of the event type instantiated when this event
    /// fires.
    #[serde(rename = "type")]
    pub event_type: TypeIdentifier,
}

impl EventDefinition {
    /// Fully qualified identifier, `group.identifier`.
    pub fn full_identifier(&self) -> String {
        format!("{}.{}", self.group, self.identifier)
    }

    /// Label, falling back to the identifier when none is declared.
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.identifier
        } else {
            &self.label
        }
    }
}

/// A named group of event definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGroupDefinition {
    /// Group identifier; forced from the map key during the build pass.
    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub events: HashMap<String, EventDefinition>,
}

impl EventGroupDefinition {
    pub fn event(&self, identifier: &str) -> Option<&EventDefinition> {
        self.events.get(identifier)
    }
}

/// A stateful, one-shot run context bound to an event definition and a
/// notification.
///
/// Instances are constructed per dispatch and never cached: `run` consumes
/// the trigger payload exactly once, after which the event's property values
/// are available for the processor.
pub trait Event: Send + Sync + Debug {
    /// Definition this event was constructed for.
    fn definition(&self) -> &EventDefinition;

    /// Notification this event is bound to.
    fn notification(&self) -> &Arc<dyn Notification>;

    /// Consume the trigger payload and fill the event's state.
    fn run(&mut self, payload: &Value) -> Result<()>;

    /// Property values gathered while running, keyed by property name.
    /// Empty until `run` was called, and empty for events without
    /// properties.
    fn property_values(&self) -> HashMap<String, Value> {
        HashMap::new()
    }
}
