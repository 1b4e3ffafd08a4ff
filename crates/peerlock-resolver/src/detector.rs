//! Single insertion-order pass that finds the first node whose chosen version
//! fails a non-stale requirer's peer constraint.

use peerlock_core::{range::evaluate, Version};

use crate::graph::{Graph, ROOT};

#[derive(Debug, Clone)]
pub struct Violation {
    pub requirer: String,
    pub range: String,
}

#[derive(Debug, Clone)]
pub struct DetectorReport {
    pub dependency: String,
    pub version: Version,
    pub greater_than: Vec<Violation>,
    pub else_violations: Vec<Violation>,
}

pub fn detect(graph: &Graph) -> Option<DetectorReport> {
    for node in graph.iter() {
        if node.stale {
            continue;
        }

        let mut greater_than = Vec::new();
        let mut else_violations = Vec::new();

        for requirer_name in node.required_by.iter() {
            if requirer_name == ROOT {
                continue;
            }
            let Some(requirer) = graph.get(requirer_name) else { continue };
            if requirer.stale {
                continue;
            }
            let Some(range_expr) = requirer.peer_dependencies.get(&node.name) else { continue };

            let result = evaluate(range_expr, &node.version);
            if !result.compatible {
                let violation = Violation { requirer: requirer_name.clone(), range: range_expr.clone() };
                if !result.higher_required {
                    greater_than.push(violation);
                } else {
                    else_violations.push(violation);
                }
            }
        }

        if !greater_than.is_empty() || !else_violations.is_empty() {
            return Some(DetectorReport {
                dependency: node.name.clone(),
                version: node.version,
                greater_than,
                else_violations,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use indexmap::IndexSet;
    use std::collections::HashMap;

    fn node(name: &str, version: &str, peers: &[(&str, &str)], stale: bool) -> Node {
        Node {
            name: name.to_string(),
            versions: vec![version.parse().unwrap()],
            version: version.parse().unwrap(),
            peer_dependencies: peers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>(),
            required_by: IndexSet::new(),
            stale,
        }
    }

    #[test]
    fn no_violations_when_versions_satisfy_ranges() {
        let mut g = Graph::new();
        g.insert(node("a", "1.0.0", &[("b", "^1.0.0")], false)).unwrap();
        g.insert(node("b", "1.5.0", &[], false)).unwrap();
        g.add_requirer("b", "a");
        assert!(detect(&g).is_none());
    }

    #[test]
    fn detects_greater_than_violation() {
        let mut g = Graph::new();
        g.insert(node("a", "1.0.0", &[("b", "^1.0.0")], false)).unwrap();
        g.insert(node("b", "2.0.0", &[], false)).unwrap();
        g.add_requirer("b", "a");

        let report = detect(&g).unwrap();
        assert_eq!(report.dependency, "b");
        assert_eq!(report.greater_than.len(), 1);
        assert!(report.else_violations.is_empty());
    }

    #[test]
    fn stale_nodes_are_skipped_entirely() {
        let mut g = Graph::new();
        g.insert(node("a", "1.0.0", &[("l", "^1.0.0")], false)).unwrap();
        g.insert(node("l", "2.0.0", &[], true)).unwrap();
        g.add_requirer("l", "a");
        assert!(detect(&g).is_none());
    }
}
