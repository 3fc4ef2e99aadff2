//! End-to-end definition tests: YAML files through the loader, the
//! pre-processing pass and the tree builder, plus property tests for the
//! pre-processing invariants.

use notiz_core::constants::types;
use notiz_core::definition::pre_processor::data_pre_processor;
use notiz_core::definition::{DefinitionLoader, DefinitionTreeBuilder};
use notiz_core::notification::DefaultSettings;
use notiz_core::registry::{Capability, ClassRegistry, TypeRecord, TypeRegistry};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn registry() -> ClassRegistry {
    let types_registry = Arc::new(TypeRegistry::with_builtins());

    types_registry
        .register(
            TypeRecord::builder("acme.email")
                .capability(Capability::Notification)
                .processor_type("acme.email-processor")
                .build(),
        )
        .unwrap();

    types_registry
        .register(
            TypeRecord::builder("acme.log-settings")
                .settings_constructor(|options| Box::new(DefaultSettings::new(options)))
                .build(),
        )
        .unwrap();

    types_registry
        .register(
            TypeRecord::builder("acme.log")
                .capability(Capability::Notification)
                .processor_type("acme.log-processor")
                .settings_type("acme.log-settings")
                .build(),
        )
        .unwrap();

    types_registry
        .register(
            TypeRecord::builder("acme.installed-event")
                .capability(Capability::Event)
                .build(),
        )
        .unwrap();

    ClassRegistry::new(types_registry)
}

fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn yaml_files_become_a_definition_tree() {
    let dir = tempfile::tempdir().unwrap();

    write_file(
        dir.path(),
        "10-notifications.yaml",
        r#"
notifications:
  admin-email:
    type: acme.email
    label: Admin email
    channels:
      smtp:
        type: acme.mailer
  audit-log:
    type: acme.log
    settings:
      verbosity: high
    channels:
      file: {}
"#,
    );

    write_file(
        dir.path(),
        "20-events.yaml",
        r#"
events:
  system:
    label: System events
    events:
      extension-installed:
        label: Extension installed
        type: acme.installed-event
"#,
    );

    let raw = DefinitionLoader::new()
        .load_from_directory(dir.path())
        .unwrap();
    let tree = DefinitionTreeBuilder::new(registry()).build(raw);

    assert!(tree.issues().is_empty());

    let admin = tree.notification("admin-email").unwrap();
    assert_eq!(admin.label(), "Admin email");
    assert_eq!(admin.channel("smtp").unwrap().identifier, "smtp");
    assert_eq!(
        admin.settings.settings_type,
        types::DEFAULT_SETTINGS.into()
    );

    // The log notification type opted into custom settings.
    let audit = tree.notification("audit-log").unwrap();
    assert_eq!(audit.settings.settings_type, "acme.log-settings".into());
    assert_eq!(audit.settings.options.get("verbosity"), Some(&json!("high")));

    assert!(tree.event("system.extension-installed").is_some());
}

#[test]
fn overlay_files_override_earlier_declarations() {
    let dir = tempfile::tempdir().unwrap();

    write_file(
        dir.path(),
        "10-base.yaml",
        "notifications:\n  admin-email:\n    type: acme.email\n    label: Base\n    channels:\n      smtp: {}\n",
    );
    write_file(
        dir.path(),
        "20-site.yaml",
        "notifications:\n  admin-email:\n    label: Site override\n",
    );

    let raw = DefinitionLoader::new()
        .load_from_directory(dir.path())
        .unwrap();
    let tree = DefinitionTreeBuilder::new(registry()).build(raw);

    let admin = tree.notification("admin-email").unwrap();
    assert_eq!(admin.label(), "Site override");
    assert_eq!(admin.notification_type, "acme.email".into());
}

#[test]
fn settings_instantiate_through_the_registry() {
    let registry = registry();
    let raw = json!({
        "notifications": {
            "audit-log": {
                "type": "acme.log",
                "settings": { "verbosity": "high" },
                "channels": { "file": {} }
            }
        }
    });

    let tree = DefinitionTreeBuilder::new(registry.clone()).build(raw);
    let definition = tree.notification("audit-log").unwrap();

    let settings = definition.settings.instantiate(&registry).unwrap();
    assert_eq!(settings.options()["verbosity"], json!("high"));
}

#[test]
fn a_definition_without_channels_is_excluded() {
    let raw = json!({
        "notifications": {
            "no-channels": { "type": "acme.email" }
        }
    });

    let tree = DefinitionTreeBuilder::new(registry()).build(raw);

    assert!(tree.notification("no-channels").is_none());
    assert_eq!(tree.issues_for("no-channels").len(), 1);
}

proptest! {
    /// Channel identifiers always mirror their map key, whatever the key is.
    #[test]
    fn channel_identifiers_mirror_arbitrary_keys(
        keys in proptest::collection::hash_set("[a-z][a-z0-9-]{0,12}", 1..6)
    ) {
        let registry = registry();

        let mut channels = serde_json::Map::new();
        for key in &keys {
            channels.insert(key.clone(), json!({ "type": "acme.mailer" }));
        }
        let raw = json!({ "type": "acme.email", "channels": channels });

        let (processed, errors) = data_pre_processor(&registry, raw);

        prop_assert!(errors.is_empty());
        for key in &keys {
            prop_assert_eq!(
                &processed["channels"][key]["identifier"],
                &Value::String(key.clone())
            );
        }
    }

    /// The pre-processing pass is idempotent over arbitrary scalar settings.
    #[test]
    fn pre_processing_is_idempotent(
        notification_type in prop_oneof![
            Just("acme.email".to_string()),
            Just("acme.log".to_string()),
            "[a-z]{1,8}\\.[a-z]{1,8}",
        ],
        settings in prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            "[a-z]{0,10}".prop_map(Value::String),
        ],
    ) {
        let registry = registry();
        let raw = json!({
            "type": notification_type,
            "settings": settings,
            "channels": { "main": {} }
        });

        let (once, errors_once) = data_pre_processor(&registry, raw);
        let (twice, errors_twice) = data_pre_processor(&registry, once.clone());

        prop_assert_eq!(once, twice);
        prop_assert_eq!(errors_once, errors_twice);
    }
}
