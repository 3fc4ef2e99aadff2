//! # Error Types
//!
//! Crate-level error aggregation plus the runtime resolution taxonomy.
//!
//! Two propagation regimes exist side by side:
//!
//! - **Definition build time** (pre-processing, tree building): validation
//!   failures become non-fatal [`DefinitionError`](crate::definition::DefinitionError)
//!   records attached to the single offending definition; the tree build
//!   always completes.
//! - **Runtime resolution** (processor factory, event factory, dispatcher):
//!   failures are fatal to the current operation and propagate as typed
//!   errors; the caller decides whether to skip, log or abort the dispatch.
//!
//! Nothing is silently swallowed: every failure is surfaced as a typed error
//! or recorded against its owning definition.

use crate::definition::loader::ConfigurationError;
use crate::definition::DefinitionError;
use crate::property::PropertyError;
use crate::registry::{Capability, RegistryError, TypeIdentifier};
use thiserror::Error;

/// Fatal errors raised while resolving processors and events at runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A declared type identifier does not resolve to a registered type.
    #[error("type not found: no type is registered for identifier `{identifier}`")]
    TypeNotFound { identifier: TypeIdentifier },

    /// The type exists but does not provide the required capability.
    #[error("invalid type: `{identifier}` is registered but does not provide the `{capability}` capability")]
    InvalidType {
        identifier: TypeIdentifier,
        capability: Capability,
    },

    /// A processor type exists but its supertype chain misses the abstract
    /// processor base.
    #[error("invalid parent: processor type `{processor}` declared by notification type `{notification}` must carry `{expected}` in its supertype chain")]
    InvalidParent {
        notification: TypeIdentifier,
        processor: TypeIdentifier,
        expected: TypeIdentifier,
    },

    /// A notification type record declares no processor type. The original
    /// system could not represent this state; here it is a registration
    /// mistake reported at resolution time.
    #[error("notification type `{identifier}` declares no processor type")]
    MissingProcessorDeclaration { identifier: TypeIdentifier },

    /// The record carries the right capability but a constructor for a
    /// different role; only reachable through a broken registration.
    #[error("type `{identifier}` provides no `{expected}` constructor")]
    ConstructorMismatch {
        identifier: TypeIdentifier,
        expected: &'static str,
    },
}

impl ResolutionError {
    pub fn type_not_found(identifier: impl Into<TypeIdentifier>) -> Self {
        Self::TypeNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn invalid_type(identifier: impl Into<TypeIdentifier>, capability: Capability) -> Self {
        Self::InvalidType {
            identifier: identifier.into(),
            capability,
        }
    }

    pub fn invalid_parent(
        notification: impl Into<TypeIdentifier>,
        processor: impl Into<TypeIdentifier>,
        expected: impl Into<TypeIdentifier>,
    ) -> Self {
        Self::InvalidParent {
            notification: notification.into(),
            processor: processor.into(),
            expected: expected.into(),
        }
    }

    pub fn missing_processor_declaration(identifier: impl Into<TypeIdentifier>) -> Self {
        Self::MissingProcessorDeclaration {
            identifier: identifier.into(),
        }
    }

    pub fn constructor_mismatch(
        identifier: impl Into<TypeIdentifier>,
        expected: &'static str,
    ) -> Self {
        Self::ConstructorMismatch {
            identifier: identifier.into(),
            expected,
        }
    }
}

/// Runtime resolvers report registry lookup failures in their own taxonomy:
/// a missing type stays `TypeNotFound`, a missing capability becomes
/// `InvalidType`.
impl From<RegistryError> for ResolutionError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::TypeNotFound { identifier } => Self::TypeNotFound { identifier },
            RegistryError::CapabilityMissing {
                identifier,
                capability,
            } => Self::InvalidType {
                identifier,
                capability,
            },
            // Not reachable from lookups; kept total for registration paths.
            RegistryError::DuplicateType { identifier } => Self::TypeNotFound { identifier },
        }
    }
}

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum NotizError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Delivery failures reported by processor implementations.
    #[error("dispatch error: {message}")]
    Dispatch { message: String },
}

impl NotizError {
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotizError>;
