//! # Type Registry Foundation
//!
//! Capability-tagged type records and the validated lookup primitives built
//! on top of them. This module is the replacement for runtime class-name
//! reflection: instead of asking a language runtime whether a class exists
//! and which interfaces it implements, every polymorphic type used by the
//! dispatch core is registered up front as a [`TypeRecord`] carrying its
//! capabilities, its supertype chain, its declarative metadata and a typed
//! constructor.
//!
//! ## Components
//!
//! - [`TypeIdentifier`] / [`Capability`] - the vocabulary of the registry
//! - [`TypeRecord`] - one registered type with metadata and constructor
//! - [`TypeRegistry`] - the in-memory type loader (register + query)
//! - [`ClassRegistry`] - validated lookup: resolve an identifier while
//!   requiring a capability, with uniform error reporting
//! - [`OverrideAliasTable`] - declared-type to implementation-type
//!   substitution

pub mod aliases;
pub mod class_registry;
pub mod record;
pub mod type_registry;

pub use aliases::OverrideAliasTable;
pub use class_registry::{ClassRegistry, ResolvedType};
pub use record::{TaggedProperty, TypeConstructor, TypeMetadata, TypeRecord, TypeRecordBuilder};
pub use type_registry::TypeRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Symbolic name referring to a registered polymorphic type.
///
/// Identifiers are plain validated strings (`"notiz.entity-email"`) so that
/// deployments can extend the type space without touching this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIdentifier(String);

impl TypeIdentifier {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last dot-separated segment of the identifier, used to derive default
    /// property tag identifiers.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeIdentifier {
    fn from(identifier: &str) -> Self {
        Self(identifier.to_string())
    }
}

impl From<String> for TypeIdentifier {
    fn from(identifier: String) -> Self {
        Self(identifier)
    }
}

/// Named behavioral contract a registered type must provide to be used in a
/// given role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// The type is a notification that can be dispatched.
    Notification,
    /// The notification type declares its own settings type instead of the
    /// default sentinel.
    CustomSettingsNotification,
    /// The type knows how to execute/send a notification.
    NotificationProcessor,
    /// The type holds per-definition notification settings.
    NotificationSettings,
    /// The type is an event bound to a notification and its definition.
    Event,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Notification => "Notification",
            Capability::CustomSettingsNotification => "CustomSettingsNotification",
            Capability::NotificationProcessor => "NotificationProcessor",
            Capability::NotificationSettings => "NotificationSettings",
            Capability::Event => "Event",
        };
        write!(f, "{name}")
    }
}

/// Errors raised by the registry lookup primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type not found: no type is registered for identifier `{identifier}`")]
    TypeNotFound { identifier: TypeIdentifier },

    #[error("type `{identifier}` does not provide the `{capability}` capability")]
    CapabilityMissing {
        identifier: TypeIdentifier,
        capability: Capability,
    },

    #[error("duplicate type registration: `{identifier}` is already registered")]
    DuplicateType { identifier: TypeIdentifier },
}

impl RegistryError {
    pub fn type_not_found(identifier: impl Into<TypeIdentifier>) -> Self {
        Self::TypeNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn capability_missing(
        identifier: impl Into<TypeIdentifier>,
        capability: Capability,
    ) -> Self {
        Self::CapabilityMissing {
            identifier: identifier.into(),
            capability,
        }
    }

    pub fn duplicate_type(identifier: impl Into<TypeIdentifier>) -> Self {
        Self::DuplicateType {
            identifier: identifier.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_takes_last_dot_segment() {
        assert_eq!(TypeIdentifier::new("notiz.entity-email").short_name(), "entity-email");
        assert_eq!(TypeIdentifier::new("marker").short_name(), "marker");
    }

    #[test]
    fn registry_errors_render_identifiers() {
        let error = RegistryError::capability_missing("acme.slack", Capability::Event);
        assert_eq!(
            error.to_string(),
            "type `acme.slack` does not provide the `Event` capability"
        );
    }
}
