//! # System Constants
//!
//! Well-known type identifiers and fixed values used across the resolution
//! core. Every built-in registry record and every sentinel the pre-processing
//! pass writes into raw definition data is named here, so that callers and
//! tests never hard-code magic strings.

/// Well-known type identifiers registered as built-ins in every
/// [`TypeRegistry`](crate::registry::TypeRegistry).
pub mod types {
    /// Sentinel settings type every notification definition receives unless
    /// its notification type declares a custom one.
    pub const DEFAULT_SETTINGS: &str = "notiz.default-settings";

    /// Abstract base type every concrete notification processor must carry
    /// in its supertype chain.
    pub const PROCESSOR_BASE: &str = "notiz.notification-processor";

    /// Abstract base type every property entry type must carry in its
    /// supertype chain before a custom tag identifier may be registered
    /// for it.
    pub const PROPERTY_ENTRY_BASE: &str = "notiz.property-entry";
}

/// Keys the pre-processing pass reads from and writes into raw definition
/// data.
pub mod data_keys {
    /// Declared notification type of a definition.
    pub const TYPE: &str = "type";

    /// Settings sub-map of a definition.
    pub const SETTINGS: &str = "settings";

    /// Resolved settings type, written by the pre-processing pass.
    pub const SETTINGS_TYPE: &str = "settings_type";

    /// Channel sub-map of a definition.
    pub const CHANNELS: &str = "channels";

    /// Identifier field forced onto keyed entries (channels, events,
    /// event groups) from their map key.
    pub const IDENTIFIER: &str = "identifier";
}

/// Lifecycle event names published by the dispatcher.
pub mod events {
    pub const NOTIFICATION_DISPATCHED: &str = "notification.dispatched";
    pub const NOTIFICATION_FAILED: &str = "notification.failed";
    pub const NOTIFICATION_SKIPPED: &str = "notification.skipped";
}

/// Icon path used when a notification definition declares none.
pub const DEFAULT_ICON_PATH: &str = "resources/icons/notification-default.svg";

/// Human description of the property tag identifier format, referenced by
/// the `WrongFormat` error.
pub const TAG_IDENTIFIER_FORMAT_DESCRIPTION: &str =
    "must contain only dashes and lowercase alphanumeric characters, cannot begin or end with a dash";
