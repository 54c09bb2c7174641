//! Error types for profile persistence

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by a profile repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    /// No learner with this id
    #[error("Learner not found: {0}")]
    NotFound(String),

    /// Reading or writing the store file failed
    #[error("Failed to access profile store at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepositoryError {
    /// Check if the write may succeed when tried again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_) | RepositoryError::Io { .. })
    }
}
