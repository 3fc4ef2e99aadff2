//! # Property Service
//!
//! Event types expose *properties* - named values templates and channel
//! settings can reference (markers, recipients, ...). Instead of scanning
//! annotations at runtime, event types declare their tagged properties in
//! their registry metadata; this service turns those declarations into
//! [`PropertyDefinition`]s.
//!
//! Each property type selects its entries by a *tag identifier*. By default
//! the tag is derived from the property type's identifier (its last dot
//! segment, dashed lower-case); deployments may register a custom tag per
//! property type, subject to format and uniqueness validation.

use crate::constants::{types, TAG_IDENTIFIER_FORMAT_DESCRIPTION};
use crate::registry::{ClassRegistry, TypeIdentifier};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised by property definition building and tag registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property type not found: `{property_type}` is not registered (while registering tag identifier `{tag}`)")]
    PropertyTypeNotFound {
        property_type: TypeIdentifier,
        tag: String,
    },

    #[error("invalid property type: `{property_type}` must carry `{expected}` in its supertype chain")]
    InvalidPropertyType {
        property_type: TypeIdentifier,
        expected: TypeIdentifier,
    },

    #[error("wrong format for tag identifier `{tag}` (suggested: `{suggested}`): {TAG_IDENTIFIER_FORMAT_DESCRIPTION}")]
    WrongFormat { tag: String, suggested: String },

    #[error("duplicate tag identifier `{tag}`: already registered for property type `{registered_for}`")]
    DuplicateTag {
        tag: String,
        registered_for: TypeIdentifier,
    },

    #[error("duplicate property entry `{name}` for event type `{event_type}`")]
    DuplicateEntry {
        name: String,
        event_type: TypeIdentifier,
    },

    #[error("event type not found: `{event_type}` is not registered")]
    EventTypeNotFound { event_type: TypeIdentifier },
}

/// One property offered by an event type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub label: String,
    pub value: Option<Value>,
}

impl PropertyEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            value: None,
        }
    }
}

/// The properties of one (event type, property type) pair.
#[derive(Debug, Clone)]
pub struct PropertyDefinition {
    event_type: TypeIdentifier,
    property_type: TypeIdentifier,
    entries: BTreeMap<String, PropertyEntry>,
}

impl PropertyDefinition {
    pub fn new(event_type: TypeIdentifier, property_type: TypeIdentifier) -> Self {
        Self {
            event_type,
            property_type,
            entries: BTreeMap::new(),
        }
    }

    pub fn event_type(&self) -> &TypeIdentifier {
        &self.event_type
    }

    pub fn property_type(&self) -> &TypeIdentifier {
        &self.property_type
    }

    /// Add an entry; entry names are unique within a definition.
    pub fn add_entry(&mut self, entry: PropertyEntry) -> Result<(), PropertyError> {
        if self.entries.contains_key(&entry.name) {
            return Err(PropertyError::DuplicateEntry {
                name: entry.name,
                event_type: self.event_type.clone(),
            });
        }

        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn entry(&self, name: &str) -> Option<&PropertyEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.entries.values()
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Builds property definitions from declarative event type metadata and
/// manages custom tag identifiers.
pub struct PropertyService {
    registry: ClassRegistry,
    property_base: TypeIdentifier,
    tag_identifiers: RwLock<HashMap<TypeIdentifier, String>>,
}

impl PropertyService {
    pub fn new(registry: ClassRegistry) -> Self {
        Self {
            registry,
            property_base: TypeIdentifier::new(types::PROPERTY_ENTRY_BASE),
            tag_identifiers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a custom tag identifier for a property type.
    ///
    /// The property type must be registered and carry the property entry
    /// base in its supertype chain; the tag must match the format
    /// `([a-z]+-)*[a-z0-9]+` and may not already be registered for another
    /// property type. Re-registering the same pair is a no-op.
    pub fn set_property_tag_identifier(
        &self,
        property_type: impl Into<TypeIdentifier>,
        tag: &str,
    ) -> Result<(), PropertyError> {
        let property_type = property_type.into();
        let tag = tag.trim().to_string();

        let record = self.registry.types().record(&property_type).ok_or_else(|| {
            PropertyError::PropertyTypeNotFound {
                property_type: property_type.clone(),
                tag: tag.clone(),
            }
        })?;

        if !record.has_supertype(&self.property_base) {
            return Err(PropertyError::InvalidPropertyType {
                property_type,
                expected: self.property_base.clone(),
            });
        }

        if !is_valid_tag_identifier(&tag) {
            return Err(PropertyError::WrongFormat {
                suggested: formatted_tag_identifier(&tag),
                tag,
            });
        }

        let mut tags = self.tag_identifiers.write();

        for (registered_for, existing_tag) in tags.iter() {
            if existing_tag == &tag && registered_for != &property_type {
                return Err(PropertyError::DuplicateTag {
                    tag,
                    registered_for: registered_for.clone(),
                });
            }
        }

        debug!(property_type = %property_type, tag = %tag, "Registered property tag identifier");
        tags.insert(property_type, tag);
        Ok(())
    }

    /// Tag identifier used to select entries for a property type: the
    /// custom one when registered, otherwise derived from the identifier's
    /// short name.
    pub fn tag_identifier_for(&self, property_type: &TypeIdentifier) -> String {
        self.tag_identifiers
            .read()
            .get(property_type)
            .cloned()
            .unwrap_or_else(|| formatted_tag_identifier(property_type.short_name()))
    }

    /// Build the property definition for an (event type, property type)
    /// pair from the event type's declarative metadata.
    pub fn build_property_definition(
        &self,
        event_type: &TypeIdentifier,
        property_type: &TypeIdentifier,
    ) -> Result<PropertyDefinition, PropertyError> {
        let record = self.registry.types().record(event_type).ok_or_else(|| {
            PropertyError::EventTypeNotFound {
                event_type: event_type.clone(),
            }
        })?;

        let tag = self.tag_identifier_for(property_type);
        let mut definition = PropertyDefinition::new(event_type.clone(), property_type.clone());

        for property in &record.metadata().tagged_properties {
            if property.tag != tag {
                continue;
            }

            let mut entry = PropertyEntry::new(property.name.clone());
            entry.label = property.label.clone();
            definition.add_entry(entry)?;
        }

        Ok(definition)
    }
}

impl std::fmt::Debug for PropertyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyService")
            .field("property_base", &self.property_base)
            .field("tag_identifiers", &*self.tag_identifiers.read())
            .finish()
    }
}

/// Format check for tag identifiers: dash-separated lowercase segments, the
/// last one may contain digits; no leading/trailing/double dash.
fn is_valid_tag_identifier(tag: &str) -> bool {
    if tag.is_empty() {
        return false;
    }

    let segments: Vec<&str> = tag.split('-').collect();

    let Some((last, init)) = segments.split_last() else {
        return false;
    };

    if last.is_empty() || !last.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return false;
    }

    init.iter()
        .all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_lowercase()))
}

/// Derive a well-formed tag identifier from an arbitrary name: camel-case
/// boundaries and underscores become dashes, everything outside
/// `[a-z0-9-]` is dropped.
fn formatted_tag_identifier(raw: &str) -> String {
    let mut formatted = String::with_capacity(raw.len());

    for character in raw.chars() {
        if character.is_ascii_uppercase() {
            if !formatted.is_empty() && !formatted.ends_with('-') {
                formatted.push('-');
            }
            formatted.push(character.to_ascii_lowercase());
        } else if character == '_' {
            if !formatted.ends_with('-') {
                formatted.push('-');
            }
        } else if character.is_ascii_lowercase() || character.is_ascii_digit() || character == '-' {
            formatted.push(character);
        }
    }

    formatted.trim_matches('-').to_string()
}
