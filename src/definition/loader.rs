//! # Definition Loader
//!
//! Discovers and merges YAML definition files into the raw data tree the
//! [`DefinitionTreeBuilder`](super::DefinitionTreeBuilder) consumes. Several
//! files can contribute to the same tree (one per extension or concern);
//! they are read in file-name order and deep-merged, so later files can add
//! to or override earlier ones the way environment overlays do.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading definition files.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("definition directory not found: {path}")]
    DefinitionDirectoryNotFound { path: PathBuf },

    #[error("failed to read definition file '{path}': {error}")]
    FileRead { path: PathBuf, error: String },

    #[error("invalid YAML in definition file '{path}': {error}")]
    InvalidYaml { path: PathBuf, error: String },

    #[error("definition file '{path}' must contain a mapping at the top level")]
    NotAMapping { path: PathBuf },
}

impl ConfigurationError {
    pub fn file_read(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_yaml(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::InvalidYaml {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

/// Loads raw definition data from YAML files.
#[derive(Debug, Clone, Default)]
pub struct DefinitionLoader;

impl DefinitionLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and deep-merge every `*.yaml`/`*.yml` file in a directory,
    /// in file-name order. An existing directory without definition files
    /// yields an empty tree.
    pub fn load_from_directory(&self, directory: &Path) -> Result<Value, ConfigurationError> {
        if !directory.is_dir() {
            return Err(ConfigurationError::DefinitionDirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }

        let mut files: Vec<PathBuf> = fs::read_dir(directory)
            .map_err(|error| ConfigurationError::file_read(directory, error))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|extension| extension.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect();

        files.sort();

        if files.is_empty() {
            warn!(directory = %directory.display(), "No definition files found");
        }

        self.load_from_files(&files)
    }

    /// Load and deep-merge an explicit list of definition files, in order.
    pub fn load_from_files(&self, files: &[PathBuf]) -> Result<Value, ConfigurationError> {
        let mut merged = Value::Object(serde_json::Map::new());

        for path in files {
            let text = fs::read_to_string(path)
                .map_err(|error| ConfigurationError::file_read(path, error))?;

            let data: Value = serde_yaml::from_str(&text)
                .map_err(|error| ConfigurationError::invalid_yaml(path, error))?;

            if !data.is_object() {
                return Err(ConfigurationError::NotAMapping { path: path.clone() });
            }

            debug!(file = %path.display(), "Merging definition file");
            deep_merge(&mut merged, data);
        }

        Ok(merged)
    }
}

/// Deep merge: maps merge key-wise, everything else is replaced by the
/// incoming value.
fn deep_merge(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn merges_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();

        write_file(
            dir.path(),
            "10-base.yaml",
            "notifications:\n  mail:\n    type: acme.basic\n    label: Base label\n",
        );
        write_file(
            dir.path(),
            "20-override.yaml",
            "notifications:\n  mail:\n    label: Overridden\n  slack:\n    type: acme.slack\n",
        );

        let merged = DefinitionLoader::new()
            .load_from_directory(dir.path())
            .unwrap();

        // Later file overrides the scalar, sibling keys merge.
        assert_eq!(merged["notifications"]["mail"]["label"], json!("Overridden"));
        assert_eq!(merged["notifications"]["mail"]["type"], json!("acme.basic"));
        assert_eq!(merged["notifications"]["slack"]["type"], json!("acme.slack"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = DefinitionLoader::new().load_from_directory(Path::new("/nonexistent/defs"));
        assert!(matches!(
            result,
            Err(ConfigurationError::DefinitionDirectoryNotFound { .. })
        ));
    }

    #[test]
    fn invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.yaml", "notifications: [unclosed");

        let result = DefinitionLoader::new().load_from_directory(dir.path());
        match result {
            Err(ConfigurationError::InvalidYaml { path: reported, .. }) => {
                assert_eq!(reported, path);
            }
            other => panic!("expected InvalidYaml, got {other:?}"),
        }
    }

    #[test]
    fn empty_directory_yields_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let merged = DefinitionLoader::new()
            .load_from_directory(dir.path())
            .unwrap();
        assert_eq!(merged, json!({}));
    }

    #[test]
    fn non_mapping_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "list.yaml", "- a\n- b\n");

        let result = DefinitionLoader::new().load_from_directory(dir.path());
        assert!(matches!(result, Err(ConfigurationError::NotAMapping { .. })));
    }
}
