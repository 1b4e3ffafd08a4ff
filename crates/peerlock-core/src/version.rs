//! Version literal: `major.minor.patch` with an optional `-0` pre-release marker.
//!
//! Accepted grammar is `^\d+\.\d+\.\d+(?:-0)?$`. Anything else (build metadata,
//! `-rc.1`, `-beta`, ...) is rejected rather than parsed loosely.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// The `-0` pre-release marker. Sorts strictly below the same triple without it.
    pub pre0: bool,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch, pre0: false }
    }

    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.pre0 {
            write!(f, "-0")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, pre0) = match s.strip_suffix("-0") {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        let mut parts = body.split('.');
        let (major, minor, patch) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(ma), Some(mi), Some(pa), None) => (ma, mi, pa),
            _ => return Err(CoreError::InvalidVersion(s.to_string())),
        };

        let component = |raw: &str| -> Result<u64, CoreError> {
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::InvalidVersion(s.to_string()));
            }
            raw.parse::<u64>()
                .map_err(|_| CoreError::InvalidVersion(s.to_string()))
        };

        Ok(Version {
            major: component(major)?,
            minor: component(minor)?,
            patch: component(patch)?,
            pre0,
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple()).then_with(|| match (self.pre0, other.pre0) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            _ => Ordering::Equal,
        })
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Version::from_str(&raw).map_err(de::Error::custom)
    }
}

/// Filters a raw list of version strings down to those matching the accepted
/// grammar, returned sorted descending.
pub fn filter_and_sort_descending(raw: &[String]) -> Vec<Version> {
    let mut versions: Vec<Version> = raw.iter().filter_map(|s| Version::from_str(s).ok()).collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions
}
