//! # Notification Definitions
//!
//! Declarative records describing configured notifications: which
//! notification type they use, which settings type applies, which channels
//! they go out on. Definitions are built once from raw configuration data
//! through a pre-processing pass (see [`pre_processor`]), collected into a
//! read-only [`DefinitionTree`](tree::DefinitionTree) and shared for the
//! process lifetime.

pub mod loader;
pub mod pre_processor;
pub mod tree;

pub use loader::DefinitionLoader;
pub use tree::{DefinitionIssue, DefinitionTree, DefinitionTreeBuilder};

use crate::constants::DEFAULT_ICON_PATH;
use crate::error::ResolutionError;
use crate::notification::NotificationSettings;
use crate::registry::{Capability, ClassRegistry, TypeIdentifier};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Non-fatal errors recorded against a single definition during the build
/// pass. The tree build never aborts on one of these; the offending
/// definition is flagged or excluded and the rest of the tree proceeds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("settings type not found: notification type `{notification_type}` declares settings type `{settings_type}` which is not registered")]
    SettingsTypeNotFound {
        notification_type: TypeIdentifier,
        settings_type: TypeIdentifier,
    },

    #[error("invalid settings type: `{settings_type}` declared by notification type `{notification_type}` does not provide the `NotificationSettings` capability")]
    InvalidSettingsType {
        notification_type: TypeIdentifier,
        settings_type: TypeIdentifier,
    },

    #[error("notification type `{notification_type}` claims custom settings but declares no settings type")]
    MissingSettingsDeclaration { notification_type: TypeIdentifier },

    #[error("notification definition has an empty identifier")]
    EmptyIdentifier,

    #[error("notification definition `{identifier}` declares no channels")]
    NoChannels { identifier: String },

    #[error("notification definition `{identifier}` declares unknown notification type `{notification_type}`")]
    UnknownNotificationType {
        identifier: String,
        notification_type: TypeIdentifier,
    },

    #[error("notification definition `{identifier}` declares type `{notification_type}` which does not provide the `Notification` capability")]
    InvalidNotificationType {
        identifier: String,
        notification_type: TypeIdentifier,
    },

    #[error("definition `{identifier}` is malformed: {message}")]
    Malformed { identifier: String, message: String },
}

impl DefinitionError {
    pub fn settings_type_not_found(
        notification_type: impl Into<TypeIdentifier>,
        settings_type: impl Into<TypeIdentifier>,
    ) -> Self {
        Self::SettingsTypeNotFound {
            notification_type: notification_type.into(),
            settings_type: settings_type.into(),
        }
    }

    pub fn invalid_settings_type(
        notification_type: impl Into<TypeIdentifier>,
        settings_type: impl Into<TypeIdentifier>,
    ) -> Self {
        Self::InvalidSettingsType {
            notification_type: notification_type.into(),
            settings_type: settings_type.into(),
        }
    }

    pub fn malformed(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            identifier: identifier.into(),
            message: message.into(),
        }
    }
}

/// Settings choice of one definition, written by the pre-processing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSpec {
    /// Settings type decided at definition build time: the default sentinel
    /// or a validated custom type.
    pub settings_type: TypeIdentifier,

    /// Remaining settings options, passed verbatim to the settings
    /// constructor.
    #[serde(flatten, default)]
    pub options: Map<String, Value>,
}

impl SettingsSpec {
    /// Instantiate the settings object this definition uses.
    ///
    /// The settings type was validated during pre-processing, so failures
    /// here only occur when the registry changed underneath the tree.
    pub fn instantiate(
        &self,
        registry: &ClassRegistry,
    ) -> Result<Box<dyn NotificationSettings>, ResolutionError> {
        let resolved = registry
            .resolve(&self.settings_type, Capability::NotificationSettings)
            .map_err(ResolutionError::from)?;

        let constructor = resolved.settings_constructor().ok_or_else(|| {
            ResolutionError::constructor_mismatch(
                self.settings_type.clone(),
                "NotificationSettings",
            )
        })?;

        Ok(constructor(Value::Object(self.options.clone())))
    }
}

/// One dispatch channel of a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    /// Channel identifier; always mirrors the map key the channel was
    /// declared under (forced by the pre-processing pass).
    #[serde(default)]
    pub identifier: String,

    /// Registry identifier of the channel's type.
    #[serde(rename = "type", default)]
    pub channel_type: Option<TypeIdentifier>,

    /// Channel-specific settings, not interpreted by this core.
    #[serde(default)]
    pub settings: Value,
}

/// Declarative record describing one configured notification.
///
/// Built once from pre-processed configuration data and immutable
/// thereafter. Identity is the `identifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDefinition {
    /// Unique identifier; forced from the map key during the build pass.
    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,

    /// Registry identifier of the notification type.
    #[serde(rename = "type")]
    pub notification_type: TypeIdentifier,

    /// Settings choice, finalized by the pre-processing pass.
    pub settings: SettingsSpec,

    /// Channels the notification goes out on, keyed by identifier.
    #[serde(default)]
    pub channels: HashMap<String, ChannelDefinition>,

    #[serde(default)]
    pub icon_path: Option<String>,
}

impl NotificationDefinition {
    /// Label, falling back to the identifier when none is declared.
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.identifier
        } else {
            &self.label
        }
    }

    /// Icon path, falling back to the crate default.
    pub fn icon_path(&self) -> &str {
        self.icon_path.as_deref().unwrap_or(DEFAULT_ICON_PATH)
    }

    pub fn channel(&self, identifier: &str) -> Option<&ChannelDefinition> {
        self.channels.get(identifier)
    }

    /// Structural validation performed by the tree builder after
    /// deserialization: non-empty identifier, at least one channel, a
    /// registered notification type providing the `Notification` capability.
    pub fn validate(&self, registry: &ClassRegistry) -> Vec<DefinitionError> {
        let mut errors = Vec::new();

        if self.identifier.is_empty() {
            errors.push(DefinitionError::EmptyIdentifier);
        }

        if self.channels.is_empty() {
            errors.push(DefinitionError::NoChannels {
                identifier: self.identifier.clone(),
            });
        }

        if !registry.types().exists(&self.notification_type) {
            errors.push(DefinitionError::UnknownNotificationType {
                identifier: self.identifier.clone(),
                notification_type: self.notification_type.clone(),
            });
        } else if !registry
            .types()
            .implements(&self.notification_type, Capability::Notification)
        {
            errors.push(DefinitionError::InvalidNotificationType {
                identifier: self.identifier.clone(),
                notification_type: self.notification_type.clone(),
            });
        }

        errors
    }
}
