//! Error taxonomy for the reconciliation core.
//!
//! Every variant propagates unchanged to the caller; the core never retries.
//! Drift is not an error: it is reported as `ResourceState::Absent`.

use std::path::{Path, PathBuf};

/// Errors raised by fetch, digest, and reconcile operations.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Transport-level failure (connect, DNS, timeout, reset).
    #[error("network error: {0}")]
    Network(#[from] curl::Error),

    /// The server answered with a status the operation cannot accept.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    /// Filesystem open/read/write/rename/remove failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A computed digest did not match the value it was required to equal.
    #[error("integrity check failed for {}: expected {expected}, got {actual}", path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Source URL does not parse or is not http(s).
    #[error("invalid source URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl MirrorError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        MirrorError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            MirrorError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = MirrorError> = std::result::Result<T, E>;
