//! Errors raised while loading or validating a pointer-analysis configuration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `max_path_edges` outside `1..=PointerAnalysisConfig::MAX_PATH_EDGES_LIMIT`
    #[error("max_path_edges = {value} is outside 1..={limit}; set it to null to replay paths of any length")]
    PathLimitOutOfRange { value: usize, limit: usize },

    #[error("pointer analysis config has no 'version' key (expected 'version: 1')")]
    MissingVersion,

    #[error("pointer analysis config version {found} cannot be read (readable: {})", versions(supported))]
    UnsupportedVersion { found: u64, supported: Vec<u64> },

    #[error("unknown preset '{0}' (expected fast, balanced, thorough or custom)")]
    UnknownPreset(String),

    #[error("cannot read pointer analysis config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed pointer analysis config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn versions(supported: &[u64]) -> String {
    supported.iter().map(u64::to_string).collect::<Vec<_>>().join(", ")
}
