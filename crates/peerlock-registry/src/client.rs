//! Blocking subprocess client over an npm-compatible registry CLI.
//!
//! Every query is `<verb> <coordinate> <field> --json`, cached under the exact
//! command string it was built from. No retries: a failed invocation means the
//! registry is unreachable for this run, full stop, per the "abort, no partial
//! writes" error policy.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::cache::Cache;
use crate::error::{RegistryError, RegistryResult};

pub struct RegistryClient {
    command: String,
    cache: Cache,
}

impl RegistryClient {
    pub fn new(command: impl Into<String>, working_dir: &Path) -> RegistryResult<Self> {
        Ok(Self { command: command.into(), cache: Cache::load(working_dir)? })
    }

    pub fn cache_path(&self) -> &Path {
        self.cache.path()
    }

    /// Primes the cache with a precomputed answer for a given full command
    /// string, bypassing the subprocess entirely. Used by downstream crates'
    /// tests that need a deterministic registry without a real `npm` binary.
    pub fn seed_cache(&mut self, command: impl Into<String>, value: Value) -> RegistryResult<()> {
        self.cache.put(command.into(), value)
    }

    #[instrument(skip(self), fields(command = %self.command))]
    fn query(&mut self, verb: &str, coordinate: &str, field: &str) -> RegistryResult<Value> {
        let key = format!("{} {} {} {} --json", self.command, verb, coordinate, field);

        if let Some(cached) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached.clone());
        }

        debug!(%key, "cache miss, invoking registry command");
        let output = Command::new(&self.command)
            .args([verb, coordinate, field, "--json"])
            .output()
            .map_err(|e| RegistryError::Unreachable { command: key.clone(), source: e })?;

        if !output.status.success() {
            return Err(RegistryError::NonZeroExit {
                command: key,
                status: output.status.code().unwrap_or(-1),
            });
        }

        let value: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| RegistryError::NonJsonOutput { command: key.clone(), source: e })?;

        self.cache.put(key, value.clone())?;
        Ok(value)
    }

    pub fn versions(&mut self, name: &str) -> RegistryResult<Vec<String>> {
        let value = self.query("info", name, "versions")?;
        Ok(value
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default())
    }

    pub fn dist_tag_latest(&mut self, name: &str) -> RegistryResult<Option<String>> {
        let value = self.query("view", name, "dist-tags")?;
        Ok(value.get("latest").and_then(|v| v.as_str()).map(str::to_string))
    }

    pub fn peer_dependencies(&mut self, name: &str, version: &str) -> RegistryResult<HashMap<String, String>> {
        let coordinate = format!("{name}@{version}");
        let value = self.query("info", &coordinate, "peerDependencies")?;
        Ok(value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn peer_dependencies_meta(&mut self, name: &str, version: &str) -> RegistryResult<HashMap<String, bool>> {
        let coordinate = format!("{name}@{version}");
        let value = self.query("info", &coordinate, "peerDependenciesMeta")?;
        Ok(value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| {
                        let optional = v.get("optional").and_then(|o| o.as_bool()).unwrap_or(false);
                        (k.clone(), optional)
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Non-optional peer dependencies at `name@version`: `peerDependencies` filtered
    /// against `peerDependenciesMeta`'s `optional: true` entries.
    pub fn non_optional_peer_dependencies(
        &mut self,
        name: &str,
        version: &str,
    ) -> RegistryResult<HashMap<String, String>> {
        let peers = self.peer_dependencies(name, version)?;
        let meta = self.peer_dependencies_meta(name, version)?;
        Ok(peers
            .into_iter()
            .filter(|(peer_name, _)| !meta.get(peer_name).copied().unwrap_or(false))
            .collect())
    }

    pub fn time(&mut self, name: &str) -> RegistryResult<HashMap<String, String>> {
        let value = self.query("info", name, "time")?;
        Ok(value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(k, _)| k.as_str() != "modified")
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default())
    }
}
