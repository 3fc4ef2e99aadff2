//! # Type Registry
//!
//! In-memory type loader: the registry every resolver consults to answer
//! "does this type exist, which contracts does it provide, what does it
//! declare". Deployments populate it once at startup with their
//! notification, processor, event and settings types; after that it is
//! read-mostly and safe to share behind an `Arc`.
//!
//! ## Usage
//!
//! ```rust
//! use notiz_core::registry::{Capability, TypeRecord, TypeRegistry};
//!
//! let registry = TypeRegistry::with_builtins();
//!
//! registry.register(
//!     TypeRecord::builder("acme.log-settings")
//!         .settings_constructor(|_| Box::new(notiz_core::notification::DefaultSettings::default()))
//!         .build(),
//! )?;
//!
//! assert!(registry.exists(&"acme.log-settings".into()));
//! assert!(registry.implements(&"acme.log-settings".into(), Capability::NotificationSettings));
//! # Ok::<(), notiz_core::registry::RegistryError>(())
//! ```

use super::record::TypeRecord;
use super::{Capability, RegistryError, TypeIdentifier};
use crate::constants::types;
use crate::notification::DefaultSettings;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Registry of all polymorphic types known to the dispatch core.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    records: RwLock<HashMap<TypeIdentifier, Arc<TypeRecord>>>,
}

impl TypeRegistry {
    /// Empty registry without built-in records. Mostly useful in tests that
    /// exercise the missing-type paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in records every deployment
    /// relies on: the abstract processor base, the abstract property entry
    /// base and the default settings type.
    pub fn with_builtins() -> Self {
        let registry = Self::new();

        let builtins = [
            TypeRecord::abstract_base(types::PROCESSOR_BASE),
            TypeRecord::abstract_base(types::PROPERTY_ENTRY_BASE),
            TypeRecord::builder(types::DEFAULT_SETTINGS)
                .settings_constructor(|options| Box::new(DefaultSettings::new(options)))
                .build(),
        ];

        for record in builtins {
            // The registry is empty, collisions are impossible here.
            let _ = registry.register(record);
        }

        registry
    }

    /// Register a type record. Fails with `DuplicateType` when the
    /// identifier is already taken.
    pub fn register(&self, record: TypeRecord) -> Result<(), RegistryError> {
        let mut records = self.records.write();

        if records.contains_key(record.identifier()) {
            return Err(RegistryError::duplicate_type(record.identifier().clone()));
        }

        debug!(
            type_identifier = %record.identifier(),
            constructor = ?record.constructor(),
            "Registered type record"
        );

        records.insert(record.identifier().clone(), Arc::new(record));
        Ok(())
    }

    /// Whether a type is registered for the identifier.
    pub fn exists(&self, identifier: &TypeIdentifier) -> bool {
        self.records.read().contains_key(identifier)
    }

    /// Whether the identified type is registered and provides the
    /// capability.
    pub fn implements(&self, identifier: &TypeIdentifier, capability: Capability) -> bool {
        self.records
            .read()
            .get(identifier)
            .map(|record| record.has_capability(capability))
            .unwrap_or(false)
    }

    /// Supertype chain of the identified type; empty when unknown.
    pub fn supertypes(&self, identifier: &TypeIdentifier) -> HashSet<TypeIdentifier> {
        self.records
            .read()
            .get(identifier)
            .map(|record| record.supertypes().clone())
            .unwrap_or_default()
    }

    /// The full record for an identifier.
    pub fn record(&self, identifier: &TypeIdentifier) -> Option<Arc<TypeRecord>> {
        self.records.read().get(identifier).cloned()
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = TypeRegistry::with_builtins();

        assert!(registry.exists(&types::PROCESSOR_BASE.into()));
        assert!(registry.exists(&types::PROPERTY_ENTRY_BASE.into()));
        assert!(registry.implements(
            &types::DEFAULT_SETTINGS.into(),
            Capability::NotificationSettings
        ));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = TypeRegistry::new();
        registry
            .register(TypeRecord::abstract_base("acme.base"))
            .unwrap();

        let result = registry.register(TypeRecord::abstract_base("acme.base"));
        assert_eq!(
            result,
            Err(RegistryError::duplicate_type("acme.base"))
        );
    }

    #[test]
    fn unknown_types_have_no_capabilities_or_supertypes() {
        let registry = TypeRegistry::new();
        let unknown = TypeIdentifier::new("acme.ghost");

        assert!(!registry.exists(&unknown));
        assert!(!registry.implements(&unknown, Capability::Notification));
        assert!(registry.supertypes(&unknown).is_empty());
    }
}
