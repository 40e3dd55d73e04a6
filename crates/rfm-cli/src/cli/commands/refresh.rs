//! `rfm refresh [id]` – detect drift; clear actual state of drifted resources.

use anyhow::Result;
use rfm_core::retry::run_with_retry;
use rfm_core::ResourceState;

use super::blocking;
use crate::cli::Host;

/// Check every selected record. A failed check is reported and skipped so the
/// remaining records are still refreshed; the command fails afterwards.
pub async fn run_refresh(host: &Host, id: Option<i64>) -> Result<()> {
    let records = match id {
        Some(id) => match host.db.get_resource(id).await? {
            Some(rec) => vec![rec],
            None => anyhow::bail!("no resource with id {id}"),
        },
        None => host.db.list_resources().await?,
    };

    let mut failed = 0usize;
    for rec in records {
        let Some(current) = rec.provisioned() else {
            println!("{}: absent", rec.id);
            continue;
        };
        let reconciler = host.reconciler.clone();
        let policy = host.retry;
        match blocking(move || run_with_retry(&policy, || reconciler.read(&current))).await {
            Ok(ResourceState::Present(_)) => println!("{}: up to date", rec.id),
            Ok(ResourceState::Absent(reason)) => {
                host.db.clear_state(rec.id).await?;
                println!("{}: drifted ({reason}); run apply to recreate", rec.id);
            }
            Err(e) => {
                tracing::warn!(id = rec.id, "refresh failed: {:#}", e);
                println!("{}: check failed: {:#}", rec.id, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} resource(s) could not be checked");
    }
    Ok(())
}
