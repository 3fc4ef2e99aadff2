//! # Notification Processor Factory
//!
//! Resolves the processor responsible for executing a notification, starting
//! from the notification's runtime type identifier:
//!
//! 1. The identifier is routed through the [`OverrideAliasTable`], so a
//!    deployment can substitute an implementation type without touching
//!    declarations.
//! 2. The resolved type is validated as a registered `Notification`.
//! 3. The cache is consulted: at most one processor instance exists per
//!    resolved notification type for the process lifetime.
//! 4. On a miss, the notification record's declared processor type is
//!    resolved as a `NotificationProcessor` whose supertype chain carries
//!    the abstract processor base, constructed with the owning notification
//!    type, cached and returned.
//!
//! The cache is keyed by the *resolved* (post-alias) identifier: two
//! declared types substituted to the same implementation share one processor
//! instance. Population is per-key compute-if-absent, so concurrent first
//! accesses stay race-free.

use crate::constants::types;
use crate::error::ResolutionError;
use crate::notification::processor::NotificationProcessor;
use crate::notification::Notification;
use crate::registry::{Capability, ClassRegistry, OverrideAliasTable, TypeIdentifier};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Factory owning the process-wide processor cache.
pub struct NotificationProcessorFactory {
    registry: ClassRegistry,
    aliases: Arc<OverrideAliasTable>,
    processor_base: TypeIdentifier,
    processors: DashMap<TypeIdentifier, Arc<dyn NotificationProcessor>>,
}

impl NotificationProcessorFactory {
    pub fn new(registry: ClassRegistry, aliases: Arc<OverrideAliasTable>) -> Self {
        Self {
            registry,
            aliases,
            processor_base: TypeIdentifier::new(types::PROCESSOR_BASE),
            processors: DashMap::new(),
        }
    }

    /// Resolve the processor for a concrete notification instance.
    pub fn from_notification(
        &self,
        notification: &dyn Notification,
    ) -> Result<Arc<dyn NotificationProcessor>, ResolutionError> {
        self.from_notification_type(notification.type_identifier())
    }

    /// Resolve the processor for a declared notification type identifier.
    pub fn from_notification_type(
        &self,
        declared: &TypeIdentifier,
    ) -> Result<Arc<dyn NotificationProcessor>, ResolutionError> {
        let resolved_type = self.aliases.resolve(declared);

        let notification = self
            .registry
            .resolve(&resolved_type, Capability::Notification)
            .map_err(ResolutionError::from)?;

        if let Some(processor) = self.processors.get(&resolved_type) {
            return Ok(processor.clone());
        }

        let processor_type = notification
            .metadata()
            .processor_type
            .clone()
            .ok_or_else(|| {
                ResolutionError::missing_processor_declaration(resolved_type.clone())
            })?;

        let processor_record = self
            .registry
            .resolve(&processor_type, Capability::NotificationProcessor)
            .map_err(ResolutionError::from)?;

        if !processor_record.has_supertype(&self.processor_base) {
            return Err(ResolutionError::invalid_parent(
                resolved_type,
                processor_type,
                self.processor_base.clone(),
            ));
        }

        let constructor = processor_record.processor_constructor().ok_or_else(|| {
            ResolutionError::constructor_mismatch(processor_type.clone(), "NotificationProcessor")
        })?;

        debug!(
            notification_type = %resolved_type,
            declared_type = %declared,
            processor_type = %processor_type,
            "Constructing notification processor"
        );

        let processor = constructor(resolved_type.clone());

        // Per-key entry population: a concurrent first access for the same
        // type keeps whichever instance won the entry.
        let entry = self
            .processors
            .entry(resolved_type)
            .or_insert(processor);

        Ok(entry.clone())
    }

    /// Number of processors constructed so far.
    pub fn cached_processors(&self) -> usize {
        self.processors.len()
    }
}

impl std::fmt::Debug for NotificationProcessorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationProcessorFactory")
            .field("processor_base", &self.processor_base)
            .field("cached_processors", &self.processors.len())
            .finish()
    }
}
