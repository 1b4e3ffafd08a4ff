//! Manifest discovery and dynamic-JSON read/write.
//!
//! Dependency-section keys are schema-free (any case-insensitive match on
//! `"dependencies"` qualifies), so the manifest is modeled as a
//! `serde_json::Map` rather than a fixed struct, per the dynamic-JSON design
//! note. It is only converted into typed `Version`/range values once it
//! crosses into the resolver.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::error::{CliError, CliResult};

const SKIP_DIRS: &[&str] = &["node_modules", ".git", "target", "dist", "build"];

pub struct Manifest {
    pub path: Utf8PathBuf,
    pub root: Map<String, Value>,
}

/// Walks `root` for files literally named `package.json`, skipping build/VCS
/// directories.
pub fn discover(root: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.file_type().is_file()
                || !SKIP_DIRS.contains(&e.file_name().to_string_lossy().as_ref())
        })
        .filter_map(Result::ok)
    {
        if entry.file_type().is_file() && entry.file_name() == "package.json" {
            if let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

impl Manifest {
    pub fn load(path: &Utf8Path) -> CliResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|_| CliError::ManifestNotFound {
            root: path.to_owned(),
        })?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|source| CliError::ManifestMalformed { path: path.to_owned(), source })?;
        let root = value
            .as_object()
            .cloned()
            .ok_or_else(|| CliError::ManifestNotAnObject { path: path.to_owned() })?;
        Ok(Self { path: path.to_owned(), root })
    }

    /// All `name -> range` entries from every key whose lowercased name
    /// contains `"dependencies"`.
    pub fn dependency_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (key, value) in &self.root {
            if !key.to_lowercase().contains("dependencies") {
                continue;
            }
            if let Some(obj) = value.as_object() {
                for name in obj.keys() {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
        }
        names
    }

    pub fn restrictions(&self) -> HashMap<String, String> {
        self.root
            .get("latestVersionRestrictions")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn backup_path(&self) -> Utf8PathBuf {
        self.path.with_extension(format!(
            "{}.bak",
            self.path.extension().unwrap_or_default()
        ))
    }

    pub fn write_backup(&self) -> CliResult<()> {
        std::fs::copy(&self.path, self.backup_path()).map_err(|_| CliError::ManifestNotFound {
            root: self.path.clone(),
        })?;
        Ok(())
    }

    /// Merges `versions` into existing dependency sections; a name absent
    /// from every section is inserted into a literal `dependencies` section.
    pub fn apply_versions(&mut self, versions: &HashMap<String, peerlock_core::Version>) {
        let mut remaining: HashMap<&str, &peerlock_core::Version> =
            versions.iter().map(|(k, v)| (k.as_str(), v)).collect();

        for (key, value) in self.root.iter_mut() {
            if !key.to_lowercase().contains("dependencies") {
                continue;
            }
            let Some(obj) = value.as_object_mut() else { continue };
            for (name, slot) in obj.iter_mut() {
                if let Some(version) = remaining.remove(name.as_str()) {
                    *slot = Value::String(version.to_string());
                }
            }
        }

        if remaining.is_empty() {
            return;
        }

        let deps = self
            .root
            .entry("dependencies".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(obj) = deps.as_object_mut() {
            for (name, version) in remaining {
                obj.insert(name.to_string(), Value::String(version.to_string()));
            }
        }
    }

    pub fn write(&self) -> CliResult<()> {
        peerlock_core::json::write_pretty_4space(self.path.as_std_path(), &Value::Object(self.root.clone()))
            .map_err(|_| CliError::ManifestNotFound { root: self.path.clone() })
    }
}
