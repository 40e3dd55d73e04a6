//! Create / Read / Delete for one mirrored file.
//!
//! There is no Update: a change to the source URL or destination is a
//! replace (Delete then Create), see [`plan`].

use crate::config::RfmConfig;
use crate::digest::{self, PRIMARY, SECONDARY};
use crate::drift::DriftDetector;
use crate::error::{MirrorError, Result};
use crate::fetch::Fetcher;
use crate::resource::{validate_source_url, AbsenceReason, DesiredState, ProvisionedState, ResourceState};
use crate::storage;
use std::io;
use std::path::{Path, PathBuf};

/// What the host has to do to move recorded state toward desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing recorded yet.
    Create,
    /// Source URL or destination changed: delete the old file, then create.
    Replace,
    /// Same identity attributes; run Read to look for drift.
    NoOp,
}

/// Decide between create, replace, and no-op. Never touches disk or network.
pub fn plan(desired: &DesiredState, recorded: Option<&ProvisionedState>) -> Action {
    match recorded {
        None => Action::Create,
        Some(r) if r.source_url != desired.source_url || r.destination != desired.destination => {
            Action::Replace
        }
        Some(r) => match &desired.expected_digest {
            Some(expected) if expected != &r.digest_primary => Action::Replace,
            _ => Action::NoOp,
        },
    }
}

/// Runs reconciliation operations. Holds no mutable state, so one instance
/// may serve distinct destinations concurrently; calls for the same
/// destination must be serialized by the caller.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    fetcher: Fetcher,
    staging_dir: Option<PathBuf>,
}

impl Reconciler {
    pub fn new(fetcher: Fetcher, staging_dir: Option<PathBuf>) -> Self {
        Self {
            fetcher,
            staging_dir,
        }
    }

    pub fn from_config(cfg: &RfmConfig) -> Self {
        Self::new(Fetcher::new(cfg.http.clone()), cfg.staging_dir.clone())
    }

    /// Download the source into place and record its fingerprints.
    ///
    /// On error nothing is recorded and the destination keeps its previous
    /// content: the body is staged and renamed only after it was digested
    /// (and matched `expected_digest`, when set).
    pub fn create(&self, desired: &DesiredState) -> Result<ProvisionedState> {
        desired.validate()?;
        let url = desired.source_url.as_str();
        let dest = desired.destination.as_path();
        tracing::info!(url, dest = %dest.display(), "creating");

        let (staged, body) = self.fetcher.fetch_staged(url, dest)?;
        let mut digests = digest::digest_path_many(staged.temp_path(), &[PRIMARY, SECONDARY])?;
        let digest_secondary = digests.pop().unwrap_or_default();
        let digest_primary = digests.pop().unwrap_or_default();

        if let Some(expected) = &desired.expected_digest {
            if expected != &digest_primary {
                return Err(MirrorError::Integrity {
                    path: dest.to_path_buf(),
                    expected: expected.clone(),
                    actual: digest_primary,
                });
            }
        }

        staged.finalize(dest)?;
        tracing::info!(
            url,
            dest = %dest.display(),
            bytes = body.bytes,
            digest = %digest_primary,
            etag = ?body.validator,
            "created"
        );

        Ok(ProvisionedState {
            source_url: desired.source_url.clone(),
            destination: desired.destination.clone(),
            digest_primary,
            digest_secondary,
            validator: body.validator,
        })
    }

    /// Check recorded state against the local file and the remote source.
    ///
    /// Drift is a normal outcome (`Absent`), not an error. Errors mean the
    /// check itself could not be completed. Never writes the destination.
    pub fn read(&self, current: &ProvisionedState) -> Result<ResourceState> {
        let dest = current.destination();

        match std::fs::metadata(dest) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                tracing::info!(dest = %dest.display(), "destination is not a regular file");
                return Ok(ResourceState::Absent(AbsenceReason::LocalDrift));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(dest = %dest.display(), "destination missing");
                return Ok(ResourceState::Absent(AbsenceReason::Missing));
            }
            Err(e) => return Err(MirrorError::io(dest, e)),
        }

        let local = digest::digest_path(dest, PRIMARY)?;
        if local != current.digest_primary {
            tracing::info!(
                dest = %dest.display(),
                recorded = %current.digest_primary,
                local = %local,
                "local file drifted"
            );
            return Ok(ResourceState::Absent(AbsenceReason::LocalDrift));
        }

        validate_source_url(&current.source_url)?;
        let detector = DriftDetector::new(&self.fetcher, self.staging_dir.as_deref());
        if detector.has_remote_changed(&current.source_url, &current.digest_primary, current.validator())? {
            return Ok(ResourceState::Absent(AbsenceReason::RemoteDrift));
        }

        tracing::debug!(dest = %dest.display(), "up to date");
        Ok(ResourceState::Present(current.clone()))
    }

    /// Remove the destination (and any leftover `.part` file). A missing file
    /// is not an error, so calling this twice is fine.
    pub fn delete(&self, current: &ProvisionedState) -> Result<()> {
        delete_path(current.destination())
    }
}

/// Remove `dest` and its staging sibling, ignoring files that are already gone.
pub fn delete_path(dest: &Path) -> Result<()> {
    for path in [dest.to_path_buf(), storage::temp_path(dest)] {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "deleted file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(MirrorError::io(&path, e)),
        }
    }
    Ok(())
}
