//! Remote drift detection.
//!
//! The validator (ETag) is only an optimization: a 304 answer to a
//! conditional GET confirms the source is unchanged without a body transfer.
//! Whenever the server sends content instead, the content digest decides.
//! Errors always propagate; a failed check never counts as "unchanged".

use crate::digest::{self, PRIMARY};
use crate::error::{MirrorError, Result};
use crate::fetch::{FetchOutcome, Fetcher};
use std::path::Path;

/// How a remote check concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCheck {
    /// Server answered 304 for the recorded validator.
    ValidatorMatched,
    /// Fresh content has the recorded digest.
    DigestMatched,
    /// Fresh content has a different digest.
    DigestChanged,
}

impl RemoteCheck {
    pub fn changed(self) -> bool {
        matches!(self, RemoteCheck::DigestChanged)
    }
}

/// Compares the remote source against a recorded digest and validator.
pub struct DriftDetector<'a> {
    fetcher: &'a Fetcher,
    staging_dir: Option<&'a Path>,
}

impl<'a> DriftDetector<'a> {
    /// `staging_dir` holds the temporary copy of fresh content; `None` uses
    /// the system temp dir.
    pub fn new(fetcher: &'a Fetcher, staging_dir: Option<&'a Path>) -> Self {
        Self {
            fetcher,
            staging_dir,
        }
    }

    /// True if the content behind `url` no longer matches `last_known_digest`.
    pub fn has_remote_changed(
        &self,
        url: &str,
        last_known_digest: &str,
        validator: Option<&str>,
    ) -> Result<bool> {
        Ok(self.check_remote(url, last_known_digest, validator)?.changed())
    }

    /// Like `has_remote_changed` but reports which path decided.
    pub fn check_remote(
        &self,
        url: &str,
        last_known_digest: &str,
        validator: Option<&str>,
    ) -> Result<RemoteCheck> {
        let validator = validator.filter(|v| !v.is_empty());

        // Removed when dropped, on every return path below.
        let mut staging = self.staging_file()?;

        match self.fetcher.fetch_conditional(url, validator, &mut staging)? {
            FetchOutcome::Unchanged => {
                tracing::debug!(url, "remote unchanged (validator matched)");
                Ok(RemoteCheck::ValidatorMatched)
            }
            FetchOutcome::Fetched(body) => {
                let remote_digest = digest::digest_path(staging.path(), PRIMARY)?;
                if remote_digest == last_known_digest {
                    tracing::debug!(url, bytes = body.bytes, "remote unchanged (digest matched)");
                    Ok(RemoteCheck::DigestMatched)
                } else {
                    tracing::info!(
                        url,
                        recorded = last_known_digest,
                        remote = %remote_digest,
                        "remote content changed"
                    );
                    Ok(RemoteCheck::DigestChanged)
                }
            }
        }
    }

    fn staging_file(&self) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".rfm-check-");
        match self.staging_dir {
            Some(dir) => builder
                .tempfile_in(dir)
                .map_err(|e| MirrorError::io(dir, e)),
            None => builder
                .tempfile()
                .map_err(|e| MirrorError::io(&std::env::temp_dir(), e)),
        }
    }
}
