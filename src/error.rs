//! Error types for branchbot

use thiserror::Error;

/// Errors that can occur in branchbot operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read, parsed or validated
    #[error("config error: {0}")]
    Config(String),

    /// Event payload or pull request listing is malformed
    #[error("event error: {0}")]
    Event(String),

    /// A git command failed for a reason other than a merge conflict
    #[error("git error: {0}")]
    Git(String),

    /// Merge kept conflicting after the retry budget was spent
    #[error("merge conflict on '{branch}' persisted after {attempts} attempt(s)")]
    MergeConflict {
        /// Branch that could not be updated
        branch: String,
        /// Number of merge attempts performed
        attempts: u32,
    },

    /// Run finished but some pull requests were left conflicted
    #[error("{count} pull request(s) left conflicted")]
    ConflictsRemaining {
        /// Number of conflicted pull requests
        count: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for branchbot operations
pub type Result<T> = std::result::Result<T, Error>;
