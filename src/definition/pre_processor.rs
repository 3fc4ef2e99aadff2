//! # Definition Pre-Processing
//!
//! The pass that runs over one definition's raw configuration data before
//! the typed [`NotificationDefinition`](super::NotificationDefinition) is
//! built. It does three things:
//!
//! - forces every channel entry to carry an `identifier` mirroring its map
//!   key, so channel identifiers can never drift from the configuration
//!   structure;
//! - guarantees a `settings` sub-map exists and stamps the default settings
//!   type into it;
//! - when the declared notification type opts into custom settings, resolves
//!   and validates the custom settings type, overwriting the default on
//!   success.
//!
//! All validation failures in this pass are non-fatal: they are returned as
//! [`DefinitionError`] records for the caller to attach to the single
//! offending definition, and the default settings type stays in place. The
//! pass is idempotent - running it twice yields the same data.

use super::DefinitionError;
use crate::constants::{data_keys, types};
use crate::registry::{Capability, ClassRegistry, TypeIdentifier};
use serde_json::{Map, Value};

/// Pre-process one definition's raw data.
///
/// Returns the processed data together with the non-fatal errors recorded
/// while resolving the settings type. Non-map input is returned unchanged;
/// the builder's deserialization reports it.
pub fn data_pre_processor(registry: &ClassRegistry, data: Value) -> (Value, Vec<DefinitionError>) {
    let mut map = match data {
        Value::Object(map) => map,
        other => return (other, Vec::new()),
    };

    force_identifiers_from_keys(&mut map, data_keys::CHANNELS);

    let settings = ensure_settings_map(&mut map);
    settings.insert(
        data_keys::SETTINGS_TYPE.to_string(),
        Value::String(types::DEFAULT_SETTINGS.to_string()),
    );

    let mut errors = Vec::new();

    if let Some(custom) = resolve_custom_settings_type(registry, &map, &mut errors) {
        // Re-borrow: the settings map is guaranteed to exist at this point.
        if let Some(settings) = map
            .get_mut(data_keys::SETTINGS)
            .and_then(Value::as_object_mut)
        {
            settings.insert(
                data_keys::SETTINGS_TYPE.to_string(),
                Value::String(custom.to_string()),
            );
        }
    }

    (Value::Object(map), errors)
}

/// Force the `identifier` field of every entry under `key` to mirror its map
/// key. Entries that are not maps are left for deserialization to report.
pub fn force_identifiers_from_keys(map: &mut Map<String, Value>, key: &str) {
    if let Some(entries) = map.get_mut(key).and_then(Value::as_object_mut) {
        for (entry_key, entry) in entries.iter_mut() {
            if let Some(entry_map) = entry.as_object_mut() {
                entry_map.insert(
                    data_keys::IDENTIFIER.to_string(),
                    Value::String(entry_key.clone()),
                );
            }
        }
    }
}

fn ensure_settings_map(map: &mut Map<String, Value>) -> &mut Map<String, Value> {
    let needs_reset = !map
        .get(data_keys::SETTINGS)
        .map(Value::is_object)
        .unwrap_or(false);

    if needs_reset {
        map.insert(data_keys::SETTINGS.to_string(), Value::Object(Map::new()));
    }

    map.get_mut(data_keys::SETTINGS)
        .and_then(Value::as_object_mut)
        .expect("settings map was just inserted")
}

/// Resolve the custom settings type the declared notification type opts
/// into, if any. Failures are recorded and leave the default in place.
fn resolve_custom_settings_type(
    registry: &ClassRegistry,
    map: &Map<String, Value>,
    errors: &mut Vec<DefinitionError>,
) -> Option<TypeIdentifier> {
    let notification_type = map
        .get(data_keys::TYPE)
        .and_then(Value::as_str)
        .map(TypeIdentifier::from)?;

    let types = registry.types();

    if !types.implements(&notification_type, Capability::CustomSettingsNotification) {
        return None;
    }

    let record = types.record(&notification_type)?;

    let Some(settings_type) = record.metadata().settings_type.clone() else {
        errors.push(DefinitionError::MissingSettingsDeclaration { notification_type });
        return None;
    };

    if !types.exists(&settings_type) {
        errors.push(DefinitionError::settings_type_not_found(
            notification_type,
            settings_type,
        ));
        return None;
    }

    if !types.implements(&settings_type, Capability::NotificationSettings) {
        errors.push(DefinitionError::invalid_settings_type(
            notification_type,
            settings_type,
        ));
        return None;
    }

    Some(settings_type)
}
