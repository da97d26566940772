//! Tree-based configuration lookup, named as an external collaborator
//! per spec.md §1 ("Configuration loading... the core only calls it").
//!
//! Real deployments parse YAML into this shape elsewhere; this crate
//! only defines the lookup contract the core relies on.

use std::collections::HashMap;

/// A string-keyed configuration tree, looked up by dotted path
/// (`detect-engine.profile`, `detect-engine.custom-values.toclient-src-groups`, ...).
pub trait ConfigSource {
    /// Returns the raw string value at `path`, if present.
    fn get(&self, path: &str) -> Option<&str>;

    /// Convenience: parse the value at `path` as `bool`.
    fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.parse().ok())
    }

    /// Convenience: parse the value at `path` as a base-10 unsigned
    /// integer of type `T`.
    fn get_uint<T: std::str::FromStr>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.parse().ok())
    }

    /// Creates (or confirms) the isolated config subtree a reload
    /// attempt is rooted at, `detect-engine-reloads.{n}` (spec.md §6).
    /// Default implementations that don't model subtree creation
    /// explicitly can treat this as always succeeding.
    fn prepare_reload_subtree(&self, n: u64) -> bool {
        let _ = n;
        true
    }
}

/// In-memory [`ConfigSource`] backing tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.values.insert(path.into(), value.into());
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, path: &str) -> Option<&str> {
        self.values.get(path).map(String::as_str)
    }

    /// Fails the subtree for reload `n` iff `detect-engine-reloads.{n}.fail`
    /// is set to any value — lets tests simulate the original's "failure
    /// to load or to find the subtree" path without a real YAML backend.
    fn prepare_reload_subtree(&self, n: u64) -> bool {
        self.get(&format!("detect-engine-reloads.{n}.fail")).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let cfg = MapConfigSource::new();
        assert_eq!(cfg.get("detect-engine.profile"), None);
    }

    #[test]
    fn round_trips_typed_values() {
        let cfg = MapConfigSource::new()
            .with("detect-engine.inspection-recursion-limit", "10")
            .with("engine.init-failure-fatal", "true");
        assert_eq!(cfg.get_uint::<u32>("detect-engine.inspection-recursion-limit"), Some(10));
        assert_eq!(cfg.get_bool("engine.init-failure-fatal"), Some(true));
    }

    #[test]
    fn reload_subtree_defaults_to_ok() {
        let cfg = MapConfigSource::new();
        assert!(cfg.prepare_reload_subtree(3));
    }

    #[test]
    fn reload_subtree_can_be_made_to_fail() {
        let cfg = MapConfigSource::new().with("detect-engine-reloads.3.fail", "1");
        assert!(!cfg.prepare_reload_subtree(3));
        assert!(cfg.prepare_reload_subtree(4));
    }
}
