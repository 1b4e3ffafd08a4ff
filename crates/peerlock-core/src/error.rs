use thiserror::Error;

/// Errors produced by the version grammar, range algebra and shared config loading.
///
/// Resolution-time conflicts (violated ranges, dead ends) are *not* represented
/// here — those are data carried by the resolver's own report types, per the
/// design note that a grammar violation is a resolution conflict, not a hard error.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid version literal: {0}")]
    InvalidVersion(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
