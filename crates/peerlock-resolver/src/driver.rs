//! Fixed-point loop: build, then alternate detect/repair until the detector
//! reports none, or a repair round makes no progress (a resolution dead end).

use std::collections::HashMap;

use peerlock_core::{ResolverConfig, Version};
use peerlock_registry::RegistryClient;
use tracing::{debug, info};

use crate::builder;
use crate::detector::detect;
use crate::error::{ResolverError, ResolverResult};
use crate::graph::Graph;
use crate::repair::{repair_mode_a, repair_mode_b};

#[derive(Debug, Clone)]
pub struct NodeSummary {
    pub version: Version,
    pub peer_dependencies: HashMap<String, String>,
    pub required_by: Vec<String>,
    pub stale: bool,
}

#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub versions: HashMap<String, Version>,
    pub peers: HashMap<String, NodeSummary>,
    pub added_beyond_seed: Vec<String>,
    pub stale: Vec<String>,
}

pub fn resolve(
    registry: &mut RegistryClient,
    config: &ResolverConfig,
    seeds: &[String],
    restrictions: &HashMap<String, String>,
) -> ResolverResult<ResolutionOutcome> {
    let mut graph = Graph::new();
    builder::build(&mut graph, registry, config, seeds, restrictions)?;
    run_fixed_point(&mut graph, registry)?;
    Ok(summarize(&graph, seeds))
}

fn run_fixed_point(graph: &mut Graph, registry: &mut RegistryClient) -> ResolverResult<()> {
    loop {
        let Some(report) = detect(graph) else {
            info!("resolution reached a fixed point with no violations");
            return Ok(());
        };

        debug!(dependency = %report.dependency, version = %report.version, "violation detected");

        let changed_a = repair_mode_a(graph, registry, &report)?;
        let changed_b = repair_mode_b(graph, registry, &report)?;

        if !changed_a && !changed_b {
            return Err(ResolverError::ResolutionDeadEnd {
                dependency: report.dependency.clone(),
                version: report.version,
                report,
            });
        }
    }
}

fn summarize(graph: &Graph, seeds: &[String]) -> ResolutionOutcome {
    let mut versions = HashMap::new();
    let mut peers = HashMap::new();
    let mut stale = Vec::new();

    for node in graph.iter() {
        versions.insert(node.name.clone(), node.version);
        peers.insert(
            node.name.clone(),
            NodeSummary {
                version: node.version,
                peer_dependencies: node.peer_dependencies.clone(),
                required_by: node.required_by.iter().cloned().collect(),
                stale: node.stale,
            },
        );
        if node.stale {
            stale.push(node.name.clone());
        }
    }

    let seed_set: std::collections::HashSet<&String> = seeds.iter().collect();
    let mut added_beyond_seed: Vec<String> =
        graph.iter().map(|n| n.name.clone()).filter(|name| !seed_set.contains(name)).collect();
    added_beyond_seed.sort();

    ResolutionOutcome { versions, peers, added_beyond_seed, stale }
}
