//! Resolver configuration: stale threshold, stale allow-list, registry command.
//!
//! Loaded from an optional `peerlock.toml` in the working directory; absent or
//! unset fields fall back to defaults silently (this is not user-facing config
//! validation, just an override knob).

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_STALE_THRESHOLD_DAYS: i64 = 365;
pub const DEFAULT_REGISTRY_COMMAND: &str = "npm";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    stale_threshold_days: Option<i64>,
    stale_allow_list: Vec<String>,
    registry_command: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub stale_threshold_days: i64,
    pub stale_allow_list: HashSet<String>,
    pub registry_command: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            stale_threshold_days: DEFAULT_STALE_THRESHOLD_DAYS,
            stale_allow_list: HashSet::new(),
            registry_command: DEFAULT_REGISTRY_COMMAND.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Loads `peerlock.toml` from `dir` if present, otherwise returns defaults.
    pub fn load(dir: &Path) -> CoreResult<Self> {
        let path = dir.join("peerlock.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::ConfigRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|e| CoreError::ConfigParse {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            stale_threshold_days: raw.stale_threshold_days.unwrap_or(DEFAULT_STALE_THRESHOLD_DAYS),
            stale_allow_list: raw.stale_allow_list.into_iter().collect(),
            registry_command: raw.registry_command.unwrap_or_else(|| DEFAULT_REGISTRY_COMMAND.to_string()),
        })
    }

    pub fn is_allow_listed(&self, name: &str) -> bool {
        self.stale_allow_list.contains(name)
    }
}
