use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to invoke registry command `{command}`: {source}")]
    Unreachable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry command `{command}` exited with status {status}")]
    NonZeroExit { command: String, status: i32 },

    #[error("registry command `{command}` produced non-JSON output: {source}")]
    NonJsonOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read cache file {path}: {source}")]
    CacheRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write cache file {path}: {source}")]
    CacheWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not valid JSON: {source}")]
    CacheCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
