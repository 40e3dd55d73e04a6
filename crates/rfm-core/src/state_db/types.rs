//! Types used by the state database.

use crate::resource::{DesiredState, ProvisionedState};
use serde::Serialize;
use std::path::PathBuf;

/// Resource identifier (row id).
pub type ResourceId = i64;

/// One managed file: desired attributes plus the last recorded actual state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub id: ResourceId,
    pub source_url: String,
    pub destination: PathBuf,
    pub expected_digest: Option<String>,
    pub digest_primary: Option<String>,
    pub digest_secondary: Option<String>,
    pub validator: Option<String>,
    /// Non-empty only while the resource is provisioned.
    pub identity: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ResourceRecord {
    pub fn desired(&self) -> DesiredState {
        DesiredState {
            source_url: self.source_url.clone(),
            destination: self.destination.clone(),
            expected_digest: self.expected_digest.clone(),
        }
    }

    /// The recorded actual state, or `None` if the identity is cleared.
    pub fn provisioned(&self) -> Option<ProvisionedState> {
        let identity = self.identity.as_deref().filter(|s| !s.is_empty())?;
        Some(ProvisionedState {
            source_url: self.source_url.clone(),
            destination: self.destination.clone(),
            digest_primary: identity.to_string(),
            digest_secondary: self.digest_secondary.clone().unwrap_or_default(),
            validator: self.validator.clone(),
        })
    }

    pub fn is_present(&self) -> bool {
        self.identity.as_deref().is_some_and(|s| !s.is_empty())
    }
}
