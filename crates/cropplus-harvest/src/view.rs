//! Read-only, hierarchical configuration lookup.
//!
//! The engine never parses configuration files. It reads typed values by
//! dotted path (`cooldowns.global`, `crops.wheat.tool-multipliers.IRON_HOE`)
//! through [`ConfigurationView`], always supplying a default. A missing or
//! mistyped key falls back to that default and is logged once.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Typed get-with-default access to configuration by dotted path.
///
/// Implementations must never fail for a missing key. They are shared
/// between the request path and background tasks, hence `Send + Sync`.
pub trait ConfigurationView: Send + Sync {
    /// Boolean at `path`, or `default`.
    fn get_bool(&self, path: &str, default: bool) -> bool;

    /// Integer at `path`, or `default`.
    fn get_int(&self, path: &str, default: i64) -> i64;

    /// Floating-point number at `path`, or `default`. Integers are widened.
    fn get_float(&self, path: &str, default: f64) -> f64;

    /// String at `path`, if present.
    fn find_string(&self, path: &str) -> Option<String>;

    /// String at `path`, or `default`.
    fn get_string(&self, path: &str, default: &str) -> String {
        self.find_string(path).unwrap_or_else(|| default.to_owned())
    }

    /// String list at `path`, or an empty list.
    fn get_string_list(&self, path: &str) -> Vec<String>;

    /// Immediate child keys of the section at `path`, in file order.
    fn section_keys(&self, path: &str) -> Vec<String>;
}

impl core::fmt::Debug for dyn ConfigurationView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ConfigurationView")
    }
}

// ---------------------------------------------------------------------------
// Missing-key log
// ---------------------------------------------------------------------------

/// Records which keys already fell back to a default so each is logged once.
#[derive(Debug, Default)]
pub struct MissingKeys {
    seen: Mutex<BTreeSet<String>>,
}

impl MissingKeys {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            seen: Mutex::new(BTreeSet::new()),
        }
    }

    /// Note a fallback for `path`; logs only the first time per key.
    pub fn note(&self, path: &str) {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.insert(path.to_owned()) {
            debug!(key = path, "Config key missing, using default");
        }
    }

    /// Forget every noted key (after a reload).
    pub fn reset(&self) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// ---------------------------------------------------------------------------
// StaticConfigView
// ---------------------------------------------------------------------------

/// A single configuration value in a [`StaticConfigView`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// `true` / `false`.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Text.
    Str(String),
    /// List of strings.
    List(Vec<String>),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_owned).collect())
    }
}

/// Flat, in-memory configuration keyed by full dotted path.
///
/// Useful for hosts that assemble settings programmatically and for tests.
/// Sections are implied by key prefixes: setting `groups.configurations.vip.range-bonus`
/// makes `vip` a key of the `groups.configurations` section.
#[derive(Debug, Default)]
pub struct StaticConfigView {
    values: BTreeMap<String, ConfigValue>,
    missing: MissingKeys,
}

impl StaticConfigView {
    /// Create an empty view; every lookup returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `path` to `value`.
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(path, value);
        self
    }

    /// Set `path` to `value` in place.
    pub fn set(&mut self, path: &str, value: impl Into<ConfigValue>) {
        self.values.insert(path.to_owned(), value.into());
    }

    fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        let value = self.values.get(path);
        if value.is_none() {
            self.missing.note(path);
        }
        value
    }
}

impl ConfigurationView for StaticConfigView {
    fn get_bool(&self, path: &str, default: bool) -> bool {
        match self.lookup(path) {
            Some(ConfigValue::Bool(v)) => *v,
            _ => default,
        }
    }

    fn get_int(&self, path: &str, default: i64) -> i64 {
        match self.lookup(path) {
            Some(ConfigValue::Int(v)) => *v,
            _ => default,
        }
    }

    #[allow(clippy::cast_precision_loss)] // Config integers are small.
    fn get_float(&self, path: &str, default: f64) -> f64 {
        match self.lookup(path) {
            Some(ConfigValue::Float(v)) => *v,
            Some(ConfigValue::Int(v)) => *v as f64,
            _ => default,
        }
    }

    fn find_string(&self, path: &str) -> Option<String> {
        match self.lookup(path) {
            Some(ConfigValue::Str(v)) => Some(v.clone()),
            _ => None,
        }
    }

    fn get_string_list(&self, path: &str) -> Vec<String> {
        match self.lookup(path) {
            Some(ConfigValue::List(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    fn section_keys(&self, path: &str) -> Vec<String> {
        let prefix = format!("{path}.");
        let mut keys: Vec<String> = Vec::new();
        for full in self.values.keys() {
            let Some(rest) = full.strip_prefix(&prefix) else {
                continue;
            };
            let child = rest.split('.').next().unwrap_or(rest);
            if !keys.iter().any(|k| k == child) {
                keys.push(child.to_owned());
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_default() {
        let view = StaticConfigView::new();
        assert!(view.get_bool("settings.enabled", true));
        assert_eq!(view.get_int("mass-harvesting.max-crops", 50), 50);
        assert_eq!(view.get_string("harvesting.drop", "CROP"), "CROP");
        assert!(view.get_string_list("worlds.allowed").is_empty());
    }

    #[test]
    fn mistyped_keys_fall_back_to_default() {
        let view = StaticConfigView::new().with("cooldowns.global", "fast");
        assert!((view.get_float("cooldowns.global", 0.5) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ints_widen_to_floats() {
        let view = StaticConfigView::new().with("cooldowns.per-crop", 2_i64);
        assert!((view.get_float("cooldowns.per-crop", 0.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn section_keys_are_unique_children() {
        let view = StaticConfigView::new()
            .with("groups.configurations.vip.range-bonus", 2_i64)
            .with("groups.configurations.vip.cooldown-multiplier", 0.5)
            .with("groups.configurations.farmer.range-bonus", 1_i64)
            .with("groups.enabled", true);
        let keys = view.section_keys("groups.configurations");
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&String::from("vip")));
        assert!(keys.contains(&String::from("farmer")));
        assert!(view.section_keys("crops").is_empty());
    }

    #[test]
    fn missing_keys_log_once() {
        let log = MissingKeys::new();
        log.note("a.b");
        log.note("a.b");
        assert_eq!(
            log.seen.lock().unwrap_or_else(PoisonError::into_inner).len(),
            1
        );
        log.reset();
        assert!(log.seen.lock().unwrap_or_else(PoisonError::into_inner).is_empty());
    }
}
