use std::path::PathBuf;
use thiserror::Error;

/// Failure to merge an invocation into an agent's counters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StatsError {
    /// A counter would exceed `u64::MAX`.
    #[error("invocation counters overflowed for agent '{agent}'")]
    CounterOverflow {
        /// Agent whose entry was left unchanged.
        agent: String,
    },
}

/// Failure to save or load a stats snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("stats file I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stats file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize stats snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The snapshot exceeds the configured size bound.
    #[error("stats snapshot is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PersistenceError::Io { path, source }
    }
}
