//! Error types.
//!
//! [`MetricError`] covers the per-request failures of the search client. They
//! are never returned from the public API; they become the `error_detail` of a
//! failed [`MetricResult`](crate::types::MetricResult). [`ContribError`] is the
//! fatal kind that ends a run.

use std::path::PathBuf;
use thiserror::Error;

/// A single remote query could not produce a count.
#[derive(Error, Debug)]
pub enum MetricError {
    /// Network, DNS or timeout failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The endpoint answered with something other than 200
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// Body was not JSON or lacked `total_count`
    #[error("decode failure: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for MetricError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MetricError::Transport(format!("request timed out: {e}"))
        } else if e.is_decode() {
            MetricError::Decode(e.to_string())
        } else {
            MetricError::Transport(e.to_string())
        }
    }
}

/// A fault that aborts the whole run.
#[derive(Error, Debug)]
pub enum ContribError {
    /// Remote clone could not complete
    #[error("failed to clone {url} into {}: {source}", .dest.display())]
    CloneFailed {
        url: String,
        dest: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// Destination path exists but cannot be used
    #[error("cannot access repository path {}: {source}", .path.display())]
    RepositoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path is not a repository, or it has no HEAD
    #[error("failed to open repository at {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// A blocking git task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
