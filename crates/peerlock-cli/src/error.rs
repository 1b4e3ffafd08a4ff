//! Top-level CLI error type. Wraps the lower crates' errors so `main` can
//! format and exit non-zero from a single `match`.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no manifest found under {root}")]
    ManifestNotFound { root: Utf8PathBuf },

    #[error("{path}: not valid JSON")]
    ManifestMalformed { path: Utf8PathBuf, #[source] source: serde_json::Error },

    #[error("{path}: root value is not a JSON object")]
    ManifestNotAnObject { path: Utf8PathBuf },

    #[error(transparent)]
    Core(#[from] peerlock_core::CoreError),

    #[error(transparent)]
    Registry(#[from] peerlock_registry::RegistryError),

    #[error(transparent)]
    Resolver(#[from] peerlock_resolver::ResolverError),

    #[error("user cancelled")]
    Cancelled,
}

pub type CliResult<T> = Result<T, CliError>;
