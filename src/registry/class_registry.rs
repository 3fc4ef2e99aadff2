//! # Class Registry
//!
//! The shared validation primitive of the resolution core: a lookup that
//! confirms a type identifier is registered *and* provides a required
//! capability before handing out the record. Centralizing this check gives
//! every resolver (processor, event, settings) the same two failure modes
//! and the same error wording.
//!
//! Instantiation is deliberately separate from resolution: [`ResolvedType`]
//! is a validated handle, and the typed constructors on the underlying
//! record are invoked by the resolvers that know which role they need.

use super::record::TypeRecord;
use super::type_registry::TypeRegistry;
use super::{Capability, RegistryError, TypeIdentifier};
use std::ops::Deref;
use std::sync::Arc;

/// Handle to a type record that passed capability validation.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    record: Arc<TypeRecord>,
    capability: Capability,
}

impl ResolvedType {
    /// Capability the lookup was validated against.
    pub fn validated_capability(&self) -> Capability {
        self.capability
    }

    pub fn record(&self) -> &Arc<TypeRecord> {
        &self.record
    }
}

impl Deref for ResolvedType {
    type Target = TypeRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

/// Validated lookup over the type registry.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    types: Arc<TypeRegistry>,
}

impl ClassRegistry {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self { types }
    }

    /// The underlying type registry.
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Resolve an identifier while requiring a capability.
    ///
    /// Fails with `TypeNotFound` when nothing is registered under the
    /// identifier, and with `CapabilityMissing` when the registered type
    /// does not provide the required capability. Pure lookup, no side
    /// effects.
    pub fn resolve(
        &self,
        identifier: &TypeIdentifier,
        capability: Capability,
    ) -> Result<ResolvedType, RegistryError> {
        let record = self
            .types
            .record(identifier)
            .ok_or_else(|| RegistryError::type_not_found(identifier.clone()))?;

        if !record.has_capability(capability) {
            return Err(RegistryError::capability_missing(
                identifier.clone(),
                capability,
            ));
        }

        Ok(ResolvedType { record, capability })
    }
}
