//! `rfm apply <url> <destination>` – reconcile one file toward its desired state.

use anyhow::{Context, Result};
use rfm_core::retry::run_with_retry;
use rfm_core::state_db::{ResourceId, ResourceRecord, StateDb};
use rfm_core::{plan, Action, DesiredState, ProvisionedState, ResourceState};
use std::path::{Path, PathBuf};

use super::blocking;
use crate::cli::Host;

/// Destinations are stored absolute so the same file always maps to one record.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("current directory")?
            .join(path))
    }
}

pub async fn run_apply(host: &Host, url: &str, destination: &Path, sha256: Option<String>) -> Result<()> {
    let mut desired = DesiredState::new(url, absolute(destination)?);
    if let Some(d) = sha256 {
        desired = desired.with_expected_digest(d);
    }
    desired.validate()?;

    let (id, recorded) = match host.db.find_by_destination(&desired.destination).await? {
        Some(rec) => {
            sync_desired(&host.db, &rec, &desired).await?;
            (rec.id, rec.provisioned())
        }
        None => (host.db.add_resource(&desired).await?, None),
    };

    match (plan(&desired, recorded.as_ref()), recorded) {
        (Action::NoOp, Some(current)) => {
            if let Some(state) = check(host, &current).await? {
                println!("{id}: up to date ({})", state.identity());
                return Ok(());
            }
            host.db.clear_state(id).await?;
        }
        (Action::Replace, Some(old)) => {
            tracing::info!(id, "desired state changed, replacing");
            let rec = host.reconciler.clone();
            blocking(move || rec.delete(&old)).await?;
            host.db.update_desired(id, &desired).await?;
        }
        _ => {}
    }

    create(host, id, desired).await
}

/// Bring the stored desired state in line with what the user declared.
///
/// Without recorded content the whole desired state is replaced. With
/// recorded content only a pin change that keeps the plan at `NoOp` is
/// stored here; source or destination changes are handled as a replace.
pub(crate) async fn sync_desired(db: &StateDb, rec: &ResourceRecord, desired: &DesiredState) -> Result<()> {
    match rec.provisioned() {
        None if rec.desired() != *desired => db.update_desired(rec.id, desired).await?,
        Some(current)
            if rec.expected_digest != desired.expected_digest
                && plan(desired, Some(&current)) == Action::NoOp =>
        {
            db.set_expected_digest(rec.id, desired.expected_digest.as_deref())
                .await?
        }
        _ => {}
    }
    Ok(())
}

/// Read with retries. `None` means the resource drifted and needs recreation.
async fn check(host: &Host, current: &ProvisionedState) -> Result<Option<ProvisionedState>> {
    let rec = host.reconciler.clone();
    let policy = host.retry;
    let current = current.clone();
    match blocking(move || run_with_retry(&policy, || rec.read(&current))).await? {
        ResourceState::Present(state) => Ok(Some(state)),
        ResourceState::Absent(reason) => {
            println!("drift detected: {reason}");
            Ok(None)
        }
    }
}

async fn create(host: &Host, id: ResourceId, desired: DesiredState) -> Result<()> {
    let rec = host.reconciler.clone();
    let policy = host.retry;
    let state = blocking(move || run_with_retry(&policy, || rec.create(&desired))).await?;
    host.db.record_provisioned(id, &state).await?;
    println!(
        "{id}: created {} ({}, md5 {}, etag {})",
        state.destination.display(),
        state.identity(),
        state.digest_secondary,
        state.validator().unwrap_or("-")
    );
    Ok(())
}
