//! RFM core: keep one local file mirrored from one remote URL.
//!
//! [`reconcile::Reconciler`] provides Create, Read (drift detection) and
//! Delete over a [`resource::ProvisionedState`]. Everything is blocking.

pub mod config;
pub mod logging;

pub mod digest;
pub mod drift;
pub mod error;
pub mod fetch;
pub mod reconcile;
pub mod resource;
pub mod retry;
pub mod state_db;
pub mod storage;

pub use error::{MirrorError, Result};
pub use reconcile::{plan, Action, Reconciler};
pub use resource::{AbsenceReason, DesiredState, ProvisionedState, ResourceState};
