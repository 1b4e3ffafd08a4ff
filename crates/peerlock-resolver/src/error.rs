use thiserror::Error;

use crate::detector::DetectorReport;
use crate::graph::GraphError;
use peerlock_core::Version;
use peerlock_registry::RegistryError;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("package {0} has no published versions matching the accepted grammar")]
    NoVersionsAvailable(String),

    #[error("resolution dead end: no candidate version repairs the violation on {dependency}@{version}")]
    ResolutionDeadEnd { dependency: String, version: Version, report: DetectorReport },
}

pub type ResolverResult<T> = Result<T, ResolverError>;
