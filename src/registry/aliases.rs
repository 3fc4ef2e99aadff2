//! # Override Alias Table
//!
//! Declared-type to implementation-type substitution. A deployment can swap
//! the implementation behind a declared notification type without touching
//! any definition that names the declared type: resolution asks this table
//! first and continues with whatever identifier comes back.
//!
//! Aliases resolve transitively (`a -> b -> c` yields `c`); a cycle stops at
//! the last identifier seen before a revisit, so resolution always
//! terminates.

use super::TypeIdentifier;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Mapping from declared type identifiers to the types actually
/// instantiated for them. Identity function for unaliased identifiers.
#[derive(Debug, Default)]
pub struct OverrideAliasTable {
    aliases: RwLock<HashMap<TypeIdentifier, TypeIdentifier>>,
}

impl OverrideAliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute `implementation` wherever `declared` is resolved.
    /// Re-registering a declared type replaces the previous substitution.
    pub fn set_implementation(
        &self,
        declared: impl Into<TypeIdentifier>,
        implementation: impl Into<TypeIdentifier>,
    ) {
        let declared = declared.into();
        let implementation = implementation.into();

        debug!(
            declared = %declared,
            implementation = %implementation,
            "Registered type override"
        );

        self.aliases.write().insert(declared, implementation);
    }

    /// Resolve a declared identifier to its implementation identifier,
    /// following alias chains.
    pub fn resolve(&self, declared: &TypeIdentifier) -> TypeIdentifier {
        let aliases = self.aliases.read();

        let mut seen = HashSet::new();
        let mut current = declared.clone();

        while let Some(next) = aliases.get(&current) {
            if !seen.insert(current.clone()) {
                break;
            }
            current = next.clone();
        }

        current
    }

    /// Whether any substitution is registered for the identifier.
    pub fn is_aliased(&self, declared: &TypeIdentifier) -> bool {
        self.aliases.read().contains_key(declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unaliased_identifier_resolves_to_itself() {
        let table = OverrideAliasTable::new();
        let identifier = TypeIdentifier::new("acme.email");

        assert_eq!(table.resolve(&identifier), identifier);
        assert!(!table.is_aliased(&identifier));
    }

    #[test]
    fn aliases_resolve_transitively() {
        let table = OverrideAliasTable::new();
        table.set_implementation("acme.email", "acme.email-v2");
        table.set_implementation("acme.email-v2", "acme.email-v3");

        assert_eq!(
            table.resolve(&"acme.email".into()),
            TypeIdentifier::new("acme.email-v3")
        );
    }

    #[test]
    fn cyclic_aliases_terminate() {
        let table = OverrideAliasTable::new();
        table.set_implementation("acme.a", "acme.b");
        table.set_implementation("acme.b", "acme.a");

        // The chain stops on revisit instead of spinning.
        let resolved = table.resolve(&"acme.a".into());
        assert!(resolved == "acme.a".into() || resolved == "acme.b".into());
    }
}
