//! Persistent, file-backed memoization keyed by the full command string.
//!
//! Deliberately not TTL-based: the spec's cache is pure with respect to its
//! key for the lifetime of the file, not a freshness window. `get`/`put` is
//! the entire interface, matching the "implementation-swappable, memory for
//! tests, JSON file for production" design note — tests construct a `Cache`
//! backed by a tempdir instead of faking a trait object.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use peerlock_core::json::write_pretty_4space;
use serde_json::Value;

use crate::error::{RegistryError, RegistryResult};

pub struct Cache {
    path: PathBuf,
    entries: IndexMap<String, Value>,
}

impl Cache {
    /// Loads `peerlock-cache.json` from `dir`, or starts empty if absent.
    pub fn load(dir: &Path) -> RegistryResult<Self> {
        let path = dir.join("peerlock-cache.json");
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| RegistryError::CacheRead {
                path: path.display().to_string(),
                source: e,
            })?;
            serde_json::from_str(&content).map_err(|e| RegistryError::CacheCorrupt {
                path: path.display().to_string(),
                source: e,
            })?
        } else {
            IndexMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Inserts `key -> value` and rewrites the whole cache file (read-modify-write,
    /// no partial updates, per the single-writer assumption in the resource model).
    pub fn put(&mut self, key: String, value: Value) -> RegistryResult<()> {
        self.entries.insert(key, value);
        write_pretty_4space(&self.path, &self.entries).map_err(|e| RegistryError::CacheWrite {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::load(dir.path()).unwrap();
        assert!(cache.get("anything").is_none());
    }

    #[test]
    fn put_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cache = Cache::load(dir.path()).unwrap();
            cache.put("npm info lodash versions --json".to_string(), json!(["1.0.0", "2.0.0"])).unwrap();
        }
        let cache = Cache::load(dir.path()).unwrap();
        assert_eq!(cache.get("npm info lodash versions --json"), Some(&json!(["1.0.0", "2.0.0"])));
    }
}
