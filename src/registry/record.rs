//! # Type Records
//!
//! A [`TypeRecord`] is one entry in the type registry: a symbolic identifier
//! plus everything the resolution core needs to know about the type without
//! runtime reflection - its capabilities, its supertype chain, its
//! class-level declarations (processor type, custom settings type, tagged
//! properties) and a typed constructor for the role it plays.
//!
//! Records are built through [`TypeRecordBuilder`], which keeps capabilities
//! consistent with the constructor that was supplied: registering a
//! notification constructor tags the record with the `Notification`
//! capability, a processor constructor with `NotificationProcessor`, and so
//! on.

use super::{Capability, TypeIdentifier};
use crate::event::{Event, EventDefinition};
use crate::notification::processor::NotificationProcessor;
use crate::notification::{Notification, NotificationSettings};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Constructs a notification instance from its raw record payload.
pub type NotificationConstructor = Arc<dyn Fn(Value) -> Arc<dyn Notification> + Send + Sync>;

/// Constructs a processor for the owning notification type.
pub type ProcessorConstructor =
    Arc<dyn Fn(TypeIdentifier) -> Arc<dyn NotificationProcessor> + Send + Sync>;

/// Constructs an event bound to an event definition and a notification.
pub type EventConstructor =
    Arc<dyn Fn(EventDefinition, Arc<dyn Notification>) -> Box<dyn Event> + Send + Sync>;

/// Constructs a settings object from the definition's settings options.
pub type SettingsConstructor = Arc<dyn Fn(Value) -> Box<dyn NotificationSettings> + Send + Sync>;

/// Typed constructor for the role a registered type plays.
///
/// Abstract records (base types that only anchor supertype chains) carry no
/// constructor at all.
#[derive(Clone)]
pub enum TypeConstructor {
    Abstract,
    Notification(NotificationConstructor),
    Processor(ProcessorConstructor),
    Event(EventConstructor),
    Settings(SettingsConstructor),
}

impl fmt::Debug for TypeConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            TypeConstructor::Abstract => "Abstract",
            TypeConstructor::Notification(_) => "Notification",
            TypeConstructor::Processor(_) => "Processor",
            TypeConstructor::Event(_) => "Event",
            TypeConstructor::Settings(_) => "Settings",
        };
        write!(f, "TypeConstructor::{variant}")
    }
}

/// One declaratively tagged property of an event type.
///
/// Replaces the original annotation scanning: event types list their tagged
/// properties in registry metadata instead of carrying doc-tag markers that
/// a reflection service would discover at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedProperty {
    /// Tag identifier this property is published under (e.g. `"marker"`).
    pub tag: String,
    /// Property name.
    pub name: String,
    /// Human label shown where the property is offered for templating.
    pub label: String,
}

/// Class-level declarations of a registered type.
#[derive(Debug, Clone, Default)]
pub struct TypeMetadata {
    /// Processor type a notification type declares for its dispatch.
    pub processor_type: Option<TypeIdentifier>,
    /// Custom settings type a notification type declares; only meaningful
    /// together with the `CustomSettingsNotification` capability.
    pub settings_type: Option<TypeIdentifier>,
    /// Declaratively tagged properties of an event type.
    pub tagged_properties: Vec<TaggedProperty>,
}

/// One registered type: identity, contracts and construction.
#[derive(Debug, Clone)]
pub struct TypeRecord {
    identifier: TypeIdentifier,
    capabilities: HashSet<Capability>,
    supertypes: HashSet<TypeIdentifier>,
    metadata: TypeMetadata,
    constructor: TypeConstructor,
}

impl TypeRecord {
    /// Start building a record for the given identifier.
    pub fn builder(identifier: impl Into<TypeIdentifier>) -> TypeRecordBuilder {
        TypeRecordBuilder::new(identifier)
    }

    /// Abstract marker record with no constructor and no capabilities.
    pub fn abstract_base(identifier: impl Into<TypeIdentifier>) -> Self {
        TypeRecordBuilder::new(identifier).build()
    }

    pub fn identifier(&self) -> &TypeIdentifier {
        &self.identifier
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn supertypes(&self) -> &HashSet<TypeIdentifier> {
        &self.supertypes
    }

    pub fn has_supertype(&self, supertype: &TypeIdentifier) -> bool {
        self.supertypes.contains(supertype)
    }

    pub fn metadata(&self) -> &TypeMetadata {
        &self.metadata
    }

    pub fn constructor(&self) -> &TypeConstructor {
        &self.constructor
    }

    pub fn notification_constructor(&self) -> Option<&NotificationConstructor> {
        match &self.constructor {
            TypeConstructor::Notification(constructor) => Some(constructor),
            _ => None,
        }
    }

    pub fn processor_constructor(&self) -> Option<&ProcessorConstructor> {
        match &self.constructor {
            TypeConstructor::Processor(constructor) => Some(constructor),
            _ => None,
        }
    }

    pub fn event_constructor(&self) -> Option<&EventConstructor> {
        match &self.constructor {
            TypeConstructor::Event(constructor) => Some(constructor),
            _ => None,
        }
    }

    pub fn settings_constructor(&self) -> Option<&SettingsConstructor> {
        match &self.constructor {
            TypeConstructor::Settings(constructor) => Some(constructor),
            _ => None,
        }
    }
}

/// Builder keeping capabilities aligned with the supplied constructor.
#[derive(Clone)]
pub struct TypeRecordBuilder {
    identifier: TypeIdentifier,
    capabilities: HashSet<Capability>,
    supertypes: HashSet<TypeIdentifier>,
    metadata: TypeMetadata,
    constructor: TypeConstructor,
}

impl TypeRecordBuilder {
    fn new(identifier: impl Into<TypeIdentifier>) -> Self {
        Self {
            identifier: identifier.into(),
            capabilities: HashSet::new(),
            supertypes: HashSet::new(),
            metadata: TypeMetadata::default(),
            constructor: TypeConstructor::Abstract,
        }
    }

    /// Add an explicit capability beyond the ones constructors imply.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Add a supertype to the record's chain.
    pub fn supertype(mut self, supertype: impl Into<TypeIdentifier>) -> Self {
        self.supertypes.insert(supertype.into());
        self
    }

    /// Declare the processor type dispatching this notification type.
    pub fn processor_type(mut self, processor_type: impl Into<TypeIdentifier>) -> Self {
        self.metadata.processor_type = Some(processor_type.into());
        self
    }

    /// Declare a custom settings type; tags the record with the
    /// `CustomSettingsNotification` capability.
    pub fn settings_type(mut self, settings_type: impl Into<TypeIdentifier>) -> Self {
        self.metadata.settings_type = Some(settings_type.into());
        self.capabilities.insert(Capability::CustomSettingsNotification);
        self
    }

    /// Declare a tagged property of an event type.
    pub fn tagged_property(
        mut self,
        tag: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.metadata.tagged_properties.push(TaggedProperty {
            tag: tag.into(),
            name: name.into(),
            label: label.into(),
        });
        self
    }

    pub fn notification_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(Value) -> Arc<dyn Notification> + Send + Sync + 'static,
    {
        self.capabilities.insert(Capability::Notification);
        self.constructor = TypeConstructor::Notification(Arc::new(constructor));
        self
    }

    pub fn processor_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(TypeIdentifier) -> Arc<dyn NotificationProcessor> + Send + Sync + 'static,
    {
        self.capabilities.insert(Capability::NotificationProcessor);
        self.constructor = TypeConstructor::Processor(Arc::new(constructor));
        self
    }

    pub fn event_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(EventDefinition, Arc<dyn Notification>) -> Box<dyn Event> + Send + Sync + 'static,
    {
        self.capabilities.insert(Capability::Event);
        self.constructor = TypeConstructor::Event(Arc::new(constructor));
        self
    }

    pub fn settings_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(Value) -> Box<dyn NotificationSettings> + Send + Sync + 'static,
    {
        self.capabilities.insert(Capability::NotificationSettings);
        self.constructor = TypeConstructor::Settings(Arc::new(constructor));
        self
    }

    pub fn build(self) -> TypeRecord {
        TypeRecord {
            identifier: self.identifier,
            capabilities: self.capabilities,
            supertypes: self.supertypes,
            metadata: self.metadata,
            constructor: self.constructor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_implies_capability() {
        let record = TypeRecord::builder("acme.settings")
            .settings_constructor(|_| Box::new(crate::notification::DefaultSettings::default()))
            .build();

        assert!(record.has_capability(Capability::NotificationSettings));
        assert!(record.settings_constructor().is_some());
        assert!(record.notification_constructor().is_none());
    }

    #[test]
    fn settings_type_declaration_tags_custom_settings() {
        let record = TypeRecord::builder("acme.notification")
            .settings_type("acme.settings")
            .build();

        assert!(record.has_capability(Capability::CustomSettingsNotification));
        assert_eq!(
            record.metadata().settings_type,
            Some(TypeIdentifier::new("acme.settings"))
        );
    }

    #[test]
    fn abstract_base_has_no_constructor() {
        let record = TypeRecord::abstract_base("notiz.notification-processor");
        assert!(matches!(record.constructor(), TypeConstructor::Abstract));
    }
}
