//! The resolution graph: a flat, name-keyed table. No pointers, no per-version
//! nodes — `required_by` is a set of names, and the only way to mutate a
//! node's version is [`Graph::set_version`], which keeps back-edges in sync.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use peerlock_core::Version;
use thiserror::Error;

/// Sentinel requirer for manifest-direct (seed) dependencies.
pub const ROOT: &str = "<root>";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} already present in graph")]
    AlreadyPresent(String),
    #[error("node {0} not found in graph")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// All published versions matching the accepted grammar, descending.
    pub versions: Vec<Version>,
    pub version: Version,
    /// Peer name -> range expression, already filtered to non-optional peers.
    pub peer_dependencies: HashMap<String, String>,
    pub required_by: IndexSet<String>,
    pub stale: bool,
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: IndexMap<String, Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self { nodes: IndexMap::new() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Nodes in insertion order, as required by the detector's single pass.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.name) {
            return Err(GraphError::AlreadyPresent(node.name));
        }
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    pub fn add_requirer(&mut self, name: &str, requirer: &str) {
        if let Some(node) = self.nodes.get_mut(name) {
            node.required_by.insert(requirer.to_string());
        }
    }

    /// Replaces `name`'s version and peer set, reconciling back-edges so that
    /// no node ends up in a `required_by` set without a corresponding
    /// `peer_dependencies` entry, or vice versa. Peers present in `new_peers`
    /// that are not yet in the graph are left without a back-edge — the
    /// builder is responsible for ever having discovered them in the first
    /// place; a repair-introduced peer with no existing node is out of scope
    /// (see DESIGN.md).
    pub fn set_version(
        &mut self,
        name: &str,
        version: Version,
        new_peers: HashMap<String, String>,
    ) -> Result<(), GraphError> {
        let old_peers = self
            .nodes
            .get(name)
            .ok_or_else(|| GraphError::NotFound(name.to_string()))?
            .peer_dependencies
            .clone();

        let old_names: HashSet<&String> = old_peers.keys().collect();
        let new_names: HashSet<&String> = new_peers.keys().collect();

        for removed in old_names.difference(&new_names) {
            if let Some(peer_node) = self.nodes.get_mut(removed.as_str()) {
                peer_node.required_by.shift_remove(name);
            }
        }
        for added in new_names.difference(&old_names) {
            if let Some(peer_node) = self.nodes.get_mut(added.as_str()) {
                peer_node.required_by.insert(name.to_string());
            }
        }

        let node = self.nodes.get_mut(name).expect("checked above");
        node.version = version;
        node.peer_dependencies = new_peers;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, version: &str, peers: &[(&str, &str)]) -> Node {
        Node {
            name: name.to_string(),
            versions: vec![version.parse().unwrap()],
            version: version.parse().unwrap(),
            peer_dependencies: peers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            required_by: IndexSet::new(),
            stale: false,
        }
    }

    #[test]
    fn insert_rejects_duplicate_name() {
        let mut g = Graph::new();
        g.insert(node("a", "1.0.0", &[])).unwrap();
        assert!(matches!(g.insert(node("a", "2.0.0", &[])), Err(GraphError::AlreadyPresent(_))));
    }

    #[test]
    fn set_version_reconciles_back_edges() {
        let mut g = Graph::new();
        g.insert(node("a", "1.0.0", &[("b", "^1.0.0"), ("c", "^1.0.0")])).unwrap();
        g.insert(node("b", "1.0.0", &[])).unwrap();
        g.insert(node("c", "1.0.0", &[])).unwrap();
        g.add_requirer("b", "a");
        g.add_requirer("c", "a");

        let mut new_peers = HashMap::new();
        new_peers.insert("c".to_string(), "^1.0.0".to_string());
        new_peers.insert("d".to_string(), "^1.0.0".to_string());
        g.insert(node("d", "1.0.0", &[])).unwrap();
        g.set_version("a", "1.1.0".parse().unwrap(), new_peers).unwrap();

        assert!(!g.get("b").unwrap().required_by.contains("a"));
        assert!(g.get("c").unwrap().required_by.contains("a"));
        assert!(g.get("d").unwrap().required_by.contains("a"));
    }
}
