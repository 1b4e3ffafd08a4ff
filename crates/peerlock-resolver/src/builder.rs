//! Graph construction: an iterative worklist expansion (preferred over true
//! recursion to keep stack depth independent of closure depth, per the
//! "recursive expansion" design note).

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use peerlock_core::version::filter_and_sort_descending;
use peerlock_core::{ResolverConfig, Version};
use peerlock_registry::RegistryClient;

use crate::error::{ResolverError, ResolverResult};
use crate::graph::{Graph, Node, ROOT};

pub fn build(
    graph: &mut Graph,
    registry: &mut RegistryClient,
    config: &ResolverConfig,
    seeds: &[String],
    restrictions: &HashMap<String, String>,
) -> ResolverResult<()> {
    let mut worklist: VecDeque<(String, String)> =
        seeds.iter().map(|name| (name.clone(), ROOT.to_string())).collect();

    while let Some((name, requirer)) = worklist.pop_front() {
        if graph.contains(&name) {
            graph.add_requirer(&name, &requirer);
            continue;
        }

        let raw_versions = registry.versions(&name)?;
        let versions = filter_and_sort_descending(&raw_versions);
        if versions.is_empty() {
            return Err(ResolverError::NoVersionsAvailable(name));
        }

        let chosen = select_initial_version(&name, &versions, restrictions, registry)?;
        let peer_map = registry.non_optional_peer_dependencies(&name, &chosen.to_string())?;
        let stale = compute_stale(&name, &versions, registry, config)?;

        let mut required_by = IndexSet::new();
        required_by.insert(requirer.clone());

        graph.insert(Node {
            name: name.clone(),
            versions,
            version: chosen,
            peer_dependencies: peer_map.clone(),
            required_by,
            stale,
        })?;

        for peer_name in peer_map.keys() {
            worklist.push_back((peer_name.clone(), name.clone()));
        }
    }

    Ok(())
}

fn select_initial_version(
    name: &str,
    versions: &[Version],
    restrictions: &HashMap<String, String>,
    registry: &mut RegistryClient,
) -> ResolverResult<Version> {
    if let Some(pin_literal) = restrictions.get(name) {
        if let Ok(pin) = pin_literal.parse::<Version>() {
            if versions.contains(&pin) {
                return Ok(pin);
            }
            if let Some(fallback) = versions.iter().find(|v| **v < pin) {
                return Ok(*fallback);
            }
        }
        return Ok(versions[0]);
    }

    if let Some(latest) = registry.dist_tag_latest(name)? {
        if let Ok(v) = latest.parse::<Version>() {
            return Ok(v);
        }
    }
    Ok(versions[0])
}

fn compute_stale(
    name: &str,
    versions: &[Version],
    registry: &mut RegistryClient,
    config: &ResolverConfig,
) -> ResolverResult<bool> {
    if config.is_allow_listed(name) {
        return Ok(false);
    }

    let times = registry.time(name)?;
    let latest_publish: Option<DateTime<Utc>> = versions
        .iter()
        .filter_map(|v| times.get(&v.to_string()))
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .max();

    match latest_publish {
        None => Ok(false),
        Some(ts) => {
            let age_days = (Utc::now() - ts).num_days();
            Ok(age_days > config.stale_threshold_days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_with(dir: &std::path::Path) -> RegistryClient {
        RegistryClient::new("npm", dir).unwrap()
    }

    #[test]
    fn trivial_seed_no_peers() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry_with(dir.path());
        registry.seed_cache("npm info A versions --json", json!(["1.2.0"])).unwrap();
        registry.seed_cache("npm view A dist-tags --json", json!({"latest": "1.2.0"})).unwrap();
        registry.seed_cache("npm info A@1.2.0 peerDependencies --json", json!({})).unwrap();
        registry.seed_cache("npm info A@1.2.0 peerDependenciesMeta --json", json!({})).unwrap();
        registry.seed_cache("npm info A time --json", json!({})).unwrap();

        let mut graph = Graph::new();
        let config = ResolverConfig::default();
        build(&mut graph, &mut registry, &config, &["A".to_string()], &HashMap::new()).unwrap();

        let a = graph.get("A").unwrap();
        assert_eq!(a.version, "1.2.0".parse().unwrap());
        assert!(a.peer_dependencies.is_empty());
        assert!(a.required_by.contains(ROOT));
    }

    #[test]
    fn discovers_peer_transitively() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry_with(dir.path());
        registry.seed_cache("npm info A versions --json", json!(["1.0.0"])).unwrap();
        registry.seed_cache("npm view A dist-tags --json", json!({"latest": "1.0.0"})).unwrap();
        registry
            .seed_cache("npm info A@1.0.0 peerDependencies --json", json!({"B": "^1.0.0"}))
            .unwrap();
        registry.seed_cache("npm info A@1.0.0 peerDependenciesMeta --json", json!({})).unwrap();
        registry.seed_cache("npm info A time --json", json!({})).unwrap();

        registry.seed_cache("npm info B versions --json", json!(["1.5.0"])).unwrap();
        registry.seed_cache("npm view B dist-tags --json", json!({"latest": "1.5.0"})).unwrap();
        registry.seed_cache("npm info B@1.5.0 peerDependencies --json", json!({})).unwrap();
        registry.seed_cache("npm info B@1.5.0 peerDependenciesMeta --json", json!({})).unwrap();
        registry.seed_cache("npm info B time --json", json!({})).unwrap();

        let mut graph = Graph::new();
        let config = ResolverConfig::default();
        build(&mut graph, &mut registry, &config, &["A".to_string()], &HashMap::new()).unwrap();

        assert_eq!(graph.get("B").unwrap().version, "1.5.0".parse().unwrap());
        assert!(graph.get("B").unwrap().required_by.contains("A"));
    }

    #[test]
    fn restriction_pin_fallback_rules() {
        assert_eq!(
            pick(&["4.0.0", "3.2.1", "3.2.0"], "3.2.1"),
            "3.2.1".parse().unwrap()
        );
        assert_eq!(pick(&["4.0.0", "3.2.0"], "3.2.1"), "3.2.0".parse().unwrap());
        assert_eq!(pick(&["4.0.0", "3.3.0"], "3.2.1"), "4.0.0".parse().unwrap());
    }

    fn pick(raw_versions: &[&str], restriction: &str) -> Version {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry_with(dir.path());
        let versions = filter_and_sort_descending(&raw_versions.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        let mut restrictions = HashMap::new();
        restrictions.insert("X".to_string(), restriction.to_string());
        select_initial_version("X", &versions, &restrictions, &mut registry).unwrap()
    }
}
