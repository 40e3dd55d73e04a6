//! Desired and actual state of a mirrored file.

use crate::error::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What the host asks for. Both fields are write-once: changing either one
/// means the resource is replaced, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    pub source_url: String,
    pub destination: PathBuf,
    /// Optional pin on the primary digest. When set, Create refuses content
    /// whose digest differs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_digest: Option<String>,
}

impl DesiredState {
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination: destination.into(),
            expected_digest: None,
        }
    }

    pub fn with_expected_digest(mut self, digest: impl Into<String>) -> Self {
        self.expected_digest = Some(digest.into());
        self
    }

    /// Checks that the source URL parses and uses http or https.
    pub fn validate(&self) -> Result<()> {
        validate_source_url(&self.source_url)
    }
}

pub(crate) fn validate_source_url(source_url: &str) -> Result<()> {
    let parsed = url::Url::parse(source_url).map_err(|e| MirrorError::InvalidUrl {
        url: source_url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MirrorError::InvalidUrl {
            url: source_url.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// Actual state recorded after a successful Create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedState {
    pub source_url: String,
    pub destination: PathBuf,
    /// Base64 SHA-256 of the destination content. Authoritative for drift.
    pub digest_primary: String,
    /// Hex MD5 of the destination content. Informational only.
    pub digest_secondary: String,
    /// ETag from the response that produced the content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl ProvisionedState {
    /// Identifies this provisioned instance. Derived from the primary digest.
    pub fn identity(&self) -> &str {
        &self.digest_primary
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Validator with empty strings treated as missing.
    pub fn validator(&self) -> Option<&str> {
        self.validator.as_deref().filter(|v| !v.is_empty())
    }
}

/// Why a Read reported the resource as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceReason {
    /// Destination file does not exist.
    Missing,
    /// Destination content no longer matches the recorded digest.
    LocalDrift,
    /// Remote source now serves different content.
    RemoteDrift,
}

impl fmt::Display for AbsenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbsenceReason::Missing => "destination missing",
            AbsenceReason::LocalDrift => "local file modified",
            AbsenceReason::RemoteDrift => "remote source changed",
        };
        f.write_str(s)
    }
}

/// Result of a Read: the resource is either still present exactly as
/// recorded, or logically absent and must be recreated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    Present(ProvisionedState),
    Absent(AbsenceReason),
}

impl ResourceState {
    pub fn is_present(&self) -> bool {
        matches!(self, ResourceState::Present(_))
    }

    pub fn present(self) -> Option<ProvisionedState> {
        match self {
            ResourceState::Present(p) => Some(p),
            ResourceState::Absent(_) => None,
        }
    }
}
