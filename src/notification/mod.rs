//! # Notification Contracts
//!
//! The behavioral contracts notification types implement, plus the default
//! settings object every definition falls back to.
//!
//! A *notification* here is one configured instance of a notification type
//! (an email to send when something happens, a chat message, ...). The
//! resolution core never looks inside concrete notification structs: it only
//! needs the runtime type identifier to find the registry record, the record
//! identifier for reporting, and the active flag for dispatch gating.

pub mod processor;
pub mod processor_factory;

pub use processor::NotificationProcessor;
pub use processor_factory::NotificationProcessorFactory;

use crate::registry::TypeIdentifier;
use serde_json::Value;
use std::fmt::Debug;

/// A configured notification instance ready to be resolved and dispatched.
pub trait Notification: Send + Sync + Debug {
    /// Registry identifier of this notification's type. This is the runtime
    /// type lookup the processor factory starts from.
    fn type_identifier(&self) -> &TypeIdentifier;

    /// Identifier of this concrete notification record.
    fn identifier(&self) -> &str;

    /// Human title, used in logs and reports.
    fn title(&self) -> &str {
        self.identifier()
    }

    /// Inactive notifications are skipped by the dispatcher.
    fn is_active(&self) -> bool {
        true
    }
}

/// Per-definition settings of a notification type.
///
/// Which settings type a definition uses is decided at definition build time
/// by the pre-processing pass: the default sentinel unless the notification
/// type declares a validated custom type.
pub trait NotificationSettings: Send + Sync + Debug {
    /// Raw options the settings object was built from.
    fn options(&self) -> &Value;
}

/// Settings object used by every notification type that does not declare a
/// custom one.
#[derive(Debug, Clone, Default)]
pub struct DefaultSettings {
    options: Value,
}

impl DefaultSettings {
    pub fn new(options: Value) -> Self {
        Self { options }
    }
}

impl NotificationSettings for DefaultSettings {
    fn options(&self) -> &Value {
        &self.options
    }
}
