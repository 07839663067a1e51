//! YAML-backed configuration view.
//!
//! The canonical configuration lives in `cropplus-config.yaml` at the
//! project root. Unlike a typed loader, [`YamlConfigView`] keeps the parsed
//! tree and answers dotted-path lookups against it, so the harvest engine
//! can read any key with its own default. A reload swaps the whole tree
//! under a write lock; the next lookup sees the new values.

use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use cropplus_harvest::{ConfigurationView, MissingKeys};
use serde_yml::Value;
use tracing::info;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The document root is a scalar or a list.
    #[error("config root must be a mapping")]
    NotAMapping,
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A reloadable configuration tree.
#[derive(Debug)]
pub struct YamlConfigView {
    root: RwLock<Value>,
    missing: MissingKeys,
}

impl YamlConfigView {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] / [`ConfigError::NotAMapping`] if the content
    /// is not a YAML mapping.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::NotAMapping`] if its root is not a mapping.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            root: RwLock::new(parse_root(yaml)?),
            missing: MissingKeys::new(),
        })
    }

    /// Replace the whole tree with `yaml`. On error the old tree stays.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn replace(&self, yaml: &str) -> Result<(), ConfigError> {
        let root = parse_root(yaml)?;
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = root;
        self.missing.reset();
        info!("Configuration replaced");
        Ok(())
    }

    /// Re-read `path` and replace the tree.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file).
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        self.replace(&contents)?;
        info!(path = %path.display(), "Configuration reloaded");
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `path` and convert it; a missing or mistyped value is noted.
    fn lookup<T>(&self, path: &str, convert: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let root = self.read();
        let found = path
            .split('.')
            .try_fold(&*root, |node, segment| node.get(segment))
            .and_then(convert);
        if found.is_none() {
            self.missing.note(path);
        }
        found
    }
}

fn parse_root(yaml: &str) -> Result<Value, ConfigError> {
    let value: Value = serde_yml::from_str(yaml)?;
    match value {
        Value::Mapping(_) => Ok(value),
        Value::Null => Ok(Value::Mapping(serde_yml::Mapping::new())),
        _ => Err(ConfigError::NotAMapping),
    }
}

impl ConfigurationView for YamlConfigView {
    fn get_bool(&self, path: &str, default: bool) -> bool {
        self.lookup(path, Value::as_bool).unwrap_or(default)
    }

    fn get_int(&self, path: &str, default: i64) -> i64 {
        self.lookup(path, Value::as_i64).unwrap_or(default)
    }

    fn get_float(&self, path: &str, default: f64) -> f64 {
        self.lookup(path, Value::as_f64).unwrap_or(default)
    }

    fn find_string(&self, path: &str) -> Option<String> {
        self.lookup(path, |v| v.as_str().map(str::to_owned))
    }

    fn get_string_list(&self, path: &str) -> Vec<String> {
        self.lookup(path, |v| {
            v.as_sequence().map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
        })
        .unwrap_or_default()
    }

    fn section_keys(&self, path: &str) -> Vec<String> {
        self.lookup(path, |v| {
            v.as_mapping().map(|map| {
                map.keys()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
        })
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
settings:
  enabled: true
cooldowns:
  global: 0.25
  per-crop: 2
tool-restrictions:
  allowed-tools:
    - ANY_HOE
    - SHEARS
groups:
  configurations:
    vip:
      range-bonus: 2
    farmer:
      range-bonus: 1
";

    fn view() -> YamlConfigView {
        YamlConfigView::parse(SAMPLE).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn typed_lookups() {
        let view = view();
        assert!(view.get_bool("settings.enabled", false));
        assert!((view.get_float("cooldowns.global", 0.0) - 0.25).abs() < f64::EPSILON);
        assert!((view.get_float("cooldowns.per-crop", 0.0) - 2.0).abs() < f64::EPSILON);
        assert_eq!(view.get_int("groups.configurations.vip.range-bonus", 0), 2);
        assert_eq!(
            view.get_string_list("tool-restrictions.allowed-tools"),
            vec!["ANY_HOE", "SHEARS"]
        );
    }

    #[test]
    fn defaults_for_missing_and_mistyped() {
        let view = view();
        assert_eq!(view.get_int("mass-harvesting.max-crops", 50), 50);
        assert!(view.get_bool("settings", true));
        assert_eq!(view.get_string("cooldowns.global", "x"), "x");
        assert!(view.get_string_list("worlds.allowed").is_empty());
    }

    #[test]
    fn section_keys_keep_file_order() {
        assert_eq!(view().section_keys("groups.configurations"), vec!["vip", "farmer"]);
    }

    #[test]
    fn replace_swaps_tree() {
        let view = view();
        let replaced = view.replace("cooldowns:\n  global: 3.0\n");
        assert!(replaced.is_ok());
        assert!((view.get_float("cooldowns.global", 0.0) - 3.0).abs() < f64::EPSILON);
        assert!(view.section_keys("groups.configurations").is_empty());
    }

    #[test]
    fn bad_replace_keeps_old_tree() {
        let view = view();
        assert!(matches!(view.replace("- a\n- b\n"), Err(ConfigError::NotAMapping)));
        assert!(matches!(view.replace("a: [unclosed"), Err(ConfigError::Yaml { .. })));
        assert!((view.get_float("cooldowns.global", 0.0) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_document_is_empty_mapping() {
        let view = YamlConfigView::parse("").unwrap_or_else(|e| panic!("{e}"));
        assert!(view.get_bool("settings.enabled", true));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = YamlConfigView::from_file(Path::new("/nonexistent/cropplus-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../cropplus-config.yaml");
        let view = YamlConfigView::from_file(&path).unwrap_or_else(|e| panic!("{e}"));
        assert!(view.get_bool("settings.enabled", false));
        assert!(!view.section_keys("crops").is_empty());
    }
}
