//! # Definition Tree
//!
//! The read-only tree of notification definitions and event groups a
//! deployment runs against. Built once from raw configuration data; after
//! the build it is immutable and safe to share across threads without
//! synchronization.
//!
//! The build pass is resilient by design: a single bad definition never
//! aborts the tree. Structural failures (missing type, no channels,
//! malformed data) exclude the offending definition; settings-resolution
//! failures keep the definition on its default settings type and flag it.
//! Every failure is recorded as a [`DefinitionIssue`].

use super::pre_processor::{data_pre_processor, force_identifiers_from_keys};
use super::{DefinitionError, NotificationDefinition};
use crate::constants::data_keys;
use crate::event::{EventDefinition, EventGroupDefinition};
use crate::registry::ClassRegistry;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One recorded problem, attached to the definition it occurred in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionIssue {
    /// Identifier of the owning definition (or event group).
    pub definition: String,
    pub error: DefinitionError,
}

/// Immutable tree of definitions.
#[derive(Debug, Clone)]
pub struct DefinitionTree {
    notifications: HashMap<String, NotificationDefinition>,
    event_groups: HashMap<String, EventGroupDefinition>,
    issues: Vec<DefinitionIssue>,
    built_at: DateTime<Utc>,
}

impl DefinitionTree {
    pub fn notification(&self, identifier: &str) -> Option<&NotificationDefinition> {
        self.notifications.get(identifier)
    }

    pub fn notifications(&self) -> impl Iterator<Item = &NotificationDefinition> {
        self.notifications.values()
    }

    pub fn event_group(&self, identifier: &str) -> Option<&EventGroupDefinition> {
        self.event_groups.get(identifier)
    }

    /// Look up an event by its full identifier, `group.event`.
    pub fn event(&self, full_identifier: &str) -> Option<&EventDefinition> {
        let (group, event) = full_identifier.split_once('.')?;
        self.event_groups.get(group)?.event(event)
    }

    /// All issues recorded during the build.
    pub fn issues(&self) -> &[DefinitionIssue] {
        &self.issues
    }

    /// Issues recorded against one definition.
    pub fn issues_for(&self, identifier: &str) -> Vec<&DefinitionIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.definition == identifier)
            .collect()
    }

    /// Whether a definition made it into the tree without any recorded
    /// issue.
    pub fn is_valid(&self, identifier: &str) -> bool {
        self.notifications.contains_key(identifier) && self.issues_for(identifier).is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Builds a [`DefinitionTree`] from raw configuration data.
#[derive(Debug, Clone)]
pub struct DefinitionTreeBuilder {
    registry: ClassRegistry,
}

impl DefinitionTreeBuilder {
    pub fn new(registry: ClassRegistry) -> Self {
        Self { registry }
    }

    /// Build the tree from a raw data value of the shape
    /// `{ notifications: { id: {...} }, events: { group: {...} } }`.
    pub fn build(&self, raw: Value) -> DefinitionTree {
        let mut notifications = HashMap::new();
        let mut issues = Vec::new();

        for (identifier, data) in entries_of(&raw, "notifications") {
            match self.build_notification(&identifier, data, &mut issues) {
                Some(definition) => {
                    notifications.insert(identifier, definition);
                }
                None => {
                    warn!(definition = %identifier, "Excluded invalid notification definition");
                }
            }
        }

        let event_groups = self.build_event_groups(&raw, &mut issues);

        debug!(
            notifications = notifications.len(),
            event_groups = event_groups.len(),
            issues = issues.len(),
            "Definition tree built"
        );

        DefinitionTree {
            notifications,
            event_groups,
            issues,
            built_at: Utc::now(),
        }
    }

    /// Pre-process, deserialize and validate one notification definition.
    ///
    /// Settings-resolution errors are recorded but keep the definition (on
    /// its default settings type); structural errors exclude it.
    fn build_notification(
        &self,
        identifier: &str,
        mut data: Value,
        issues: &mut Vec<DefinitionIssue>,
    ) -> Option<NotificationDefinition> {
        if let Some(map) = data.as_object_mut() {
            map.insert(
                data_keys::IDENTIFIER.to_string(),
                Value::String(identifier.to_string()),
            );
        }

        let (processed, settings_errors) = data_pre_processor(&self.registry, data);

        for error in settings_errors {
            issues.push(DefinitionIssue {
                definition: identifier.to_string(),
                error,
            });
        }

        let definition: NotificationDefinition = match serde_json::from_value(processed) {
            Ok(definition) => definition,
            Err(error) => {
                issues.push(DefinitionIssue {
                    definition: identifier.to_string(),
                    error: DefinitionError::malformed(identifier, error.to_string()),
                });
                return None;
            }
        };

        let validation_errors = definition.validate(&self.registry);
        if !validation_errors.is_empty() {
            for error in validation_errors {
                issues.push(DefinitionIssue {
                    definition: identifier.to_string(),
                    error,
                });
            }
            return None;
        }

        Some(definition)
    }

    fn build_event_groups(
        &self,
        raw: &Value,
        issues: &mut Vec<DefinitionIssue>,
    ) -> HashMap<String, EventGroupDefinition> {
        let mut groups = HashMap::new();

        for (group_identifier, group_data) in entries_of(raw, "events") {
            let mut group_data = group_data;

            if let Some(map) = group_data.as_object_mut() {
                map.insert(
                    data_keys::IDENTIFIER.to_string(),
                    Value::String(group_identifier.clone()),
                );
                force_identifiers_from_keys(map, "events");

                // Events carry their owning group for full identifiers.
                if let Some(events) = map.get_mut("events").and_then(Value::as_object_mut) {
                    for event in events.values_mut() {
                        if let Some(event_map) = event.as_object_mut() {
                            event_map.insert(
                                "group".to_string(),
                                Value::String(group_identifier.clone()),
                            );
                        }
                    }
                }
            }

            match serde_json::from_value::<EventGroupDefinition>(group_data) {
                Ok(group) => {
                    groups.insert(group_identifier, group);
                }
                Err(error) => {
                    issues.push(DefinitionIssue {
                        definition: group_identifier.clone(),
                        error: DefinitionError::malformed(&group_identifier, error.to_string()),
                    });
                    warn!(group = %group_identifier, "Excluded malformed event group");
                }
            }
        }

        groups
    }
}

/// Key/value pairs of a map entry under `key`; empty for anything else.
fn entries_of(raw: &Value, key: &str) -> Vec<(String, Value)> {
    raw.get(key)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}
