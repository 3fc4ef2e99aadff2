//! # NotiZ Core
//!
//! Resolution core of a configurable notification dispatch system.
//!
//! ## Overview
//!
//! Deployments describe their notifications declaratively: which notification
//! type a definition uses, which settings type applies, which channels it
//! goes out on, which events trigger it. This crate turns those declarations
//! into dispatches: it validates the declared types against a capability-
//! tagged registry, resolves the processor responsible for delivery (with
//! process-lifetime caching and override aliasing), constructs per-dispatch
//! event instances and drives the delivery lifecycle.
//!
//! ## Architecture
//!
//! All polymorphic types are registered up front as [`registry::TypeRecord`]s
//! carrying capabilities, supertype chains, declarative metadata and typed
//! constructors. Resolution never asks a runtime "does this class exist":
//! it asks the registry, and every lookup states the capability it requires.
//!
//! Two error regimes coexist. Definition build time is resilient: one bad
//! definition is flagged or excluded, the tree always builds. Runtime
//! resolution is strict: unknown types and missing capabilities fail the
//! current dispatch with a typed error.
//!
//! ## Module Organization
//!
//! - [`registry`] - capability-tagged type records, validated lookup,
//!   override aliases
//! - [`notification`] - notification contracts and the processor factory
//! - [`event`] - event definitions, the event contract and its factory
//! - [`definition`] - definition loading, pre-processing and the tree
//! - [`dispatch`] - the dispatcher and its lifecycle publisher
//! - [`property`] - declarative tagged properties of event types
//! - [`error`] - crate-level error aggregation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notiz_core::definition::{DefinitionLoader, DefinitionTreeBuilder};
//! use notiz_core::registry::{ClassRegistry, TypeRegistry};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn example() -> notiz_core::Result<()> {
//! let types = Arc::new(TypeRegistry::with_builtins());
//! // ... register the deployment's notification, processor and event types ...
//!
//! let registry = ClassRegistry::new(types);
//! let raw = DefinitionLoader::new().load_from_directory(Path::new("config/notiz"))?;
//! let tree = DefinitionTreeBuilder::new(registry).build(raw);
//!
//! for issue in tree.issues() {
//!     eprintln!("{}: {}", issue.definition, issue.error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod logging;
pub mod notification;
pub mod property;
pub mod registry;

pub use definition::{DefinitionTree, DefinitionTreeBuilder, NotificationDefinition};
pub use dispatch::{DispatchOutcome, DispatchReport, Dispatcher};
pub use error::{NotizError, ResolutionError, Result};
pub use event::{Event, EventDefinition, EventFactory};
pub use notification::{Notification, NotificationProcessor, NotificationProcessorFactory};
pub use registry::{Capability, ClassRegistry, TypeIdentifier, TypeRecord, TypeRegistry};
