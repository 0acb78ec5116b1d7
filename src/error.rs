use std::path::PathBuf;
use thiserror::Error;

/// Rejected run configuration. Raised before any round is played.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("discount factor of firm {firm} must lie in [0, 1], got {value}")]
    Discount { firm: usize, value: f64 },

    #[error("{what} must be positive")]
    NonPositive { what: &'static str },

    #[error("at least two price levels are required, got {0}")]
    PriceLevels(usize),

    #[error("exploration constant must be finite and non-negative, got {0}")]
    Exploration(f64),

    #[error("initial state ({0}, {1}) lies outside the market 0..={2}")]
    InitialState(u32, u32, u32),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("run {run} panicked: {message}")]
    Panicked { run: usize, message: String },

    #[error("snapshot of kind `{found}` cannot be restored into a `{expected}` agent")]
    SnapshotKind {
        expected: &'static str,
        found: &'static str,
    },
}

impl SimError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
