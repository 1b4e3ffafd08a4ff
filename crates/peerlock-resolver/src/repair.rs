//! Two repair strategies applied to a single [`DetectorReport`].
//!
//! Mode A walks `d`'s own version list downward once per complaining peer in
//! `greater_than`, unconditionally committing the version reached by the last
//! peer processed — the "last-iteration-wins" behavior is preserved as-is
//! rather than fixed to "satisfy all peers at once", per the documented quirk.
//! Mode B binary-searches each `else` peer's version list for the highest
//! version that still accepts `d`'s current version.

use peerlock_core::range::evaluate;
use peerlock_registry::RegistryClient;

use crate::detector::DetectorReport;
use crate::error::ResolverResult;
use crate::graph::Graph;

/// Returns `true` if the dependency's version actually changed.
pub fn repair_mode_a(graph: &mut Graph, registry: &mut RegistryClient, report: &DetectorReport) -> ResolverResult<bool> {
    if report.greater_than.is_empty() {
        return Ok(false);
    }

    let dependency = report.dependency.clone();
    let original_version = report.version;
    let versions = graph.get(&dependency).expect("reported node exists").versions.clone();

    let mut chosen = original_version;
    for violation in &report.greater_than {
        let mut candidate = original_version;
        for &v in versions.iter().filter(|v| **v < original_version) {
            candidate = v;
            let result = evaluate(&violation.range, &v);
            if result.higher_required {
                // either satisfied, or we've overshot below where it ever helps
                break;
            }
        }
        chosen = candidate;
        let peers = registry.non_optional_peer_dependencies(&dependency, &chosen.to_string())?;
        graph.set_version(&dependency, chosen, peers)?;
    }

    Ok(chosen != original_version)
}

/// Returns `true` if at least one complaining peer was downgraded.
pub fn repair_mode_b(graph: &mut Graph, registry: &mut RegistryClient, report: &DetectorReport) -> ResolverResult<bool> {
    let dependency = report.dependency.clone();
    let mut changed = false;

    for violation in &report.else_violations {
        let peer_name = violation.requirer.clone();
        let dependency_version = graph.get(&dependency).expect("reported node exists").version;
        let peer_versions = graph.get(&peer_name).expect("violating requirer exists").versions.clone();
        if peer_versions.is_empty() {
            continue;
        }

        let mut lo: i64 = 0;
        let mut hi: i64 = peer_versions.len() as i64 - 1;
        let mut result = None;

        while lo <= hi {
            let mid = ((lo + hi) / 2) as usize;
            let candidate = peer_versions[mid];
            let peers_at_candidate = registry.non_optional_peer_dependencies(&peer_name, &candidate.to_string())?;

            match peers_at_candidate.get(&dependency) {
                None => {
                    // Peer link vanished at this version; older majors may still carry it.
                    hi = mid as i64 - 1;
                }
                Some(range_expr) => {
                    let eval = evaluate(range_expr, &dependency_version);
                    if eval.compatible {
                        result = Some(candidate);
                        hi = mid as i64 - 1;
                    } else if !eval.higher_required {
                        hi = mid as i64 - 1;
                    } else {
                        lo = mid as i64 + 1;
                    }
                }
            }
        }

        if let Some(new_version) = result {
            let new_peers = registry.non_optional_peer_dependencies(&peer_name, &new_version.to_string())?;
            graph.set_version(&peer_name, new_version, new_peers)?;
            changed = true;
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Violation;
    use crate::graph::Node;
    use indexmap::IndexSet;
    use std::collections::HashMap;

    fn node(name: &str, versions: &[&str], version: &str, peers: &[(&str, &str)]) -> Node {
        Node {
            name: name.to_string(),
            versions: versions.iter().map(|s| s.parse().unwrap()).collect(),
            version: version.parse().unwrap(),
            peer_dependencies: peers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>(),
            required_by: IndexSet::new(),
            stale: false,
        }
    }

    #[test]
    fn mode_a_downgrades_to_satisfying_version() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = RegistryClient::new("npm", dir.path()).unwrap();
        registry.seed_cache("npm info B@1.9.0 peerDependencies --json", serde_json::json!({})).unwrap();
        registry.seed_cache("npm info B@1.9.0 peerDependenciesMeta --json", serde_json::json!({})).unwrap();

        let mut g = Graph::new();
        g.insert(node("A", &["1.0.0"], "1.0.0", &[("B", "^1.0.0")])).unwrap();
        g.insert(node("B", &["2.0.0", "1.9.0"], "2.0.0", &[])).unwrap();
        g.add_requirer("B", "A");

        let report = DetectorReport {
            dependency: "B".to_string(),
            version: "2.0.0".parse().unwrap(),
            greater_than: vec![Violation { requirer: "A".to_string(), range: "^1.0.0".to_string() }],
            else_violations: vec![],
        };

        let changed = repair_mode_a(&mut g, &mut registry, &report).unwrap();
        assert!(changed);
        assert_eq!(g.get("B").unwrap().version, "1.9.0".parse().unwrap());
    }
}
