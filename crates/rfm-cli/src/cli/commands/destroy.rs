//! `rfm destroy <id>` – delete the managed file; drop or keep the record.

use anyhow::Result;
use rfm_core::reconcile::delete_path;

use super::blocking;
use crate::cli::Host;

pub async fn run_destroy(host: &Host, id: i64, keep_record: bool) -> Result<()> {
    let Some(rec) = host.db.get_resource(id).await? else {
        anyhow::bail!("no resource with id {id}");
    };

    match rec.provisioned() {
        Some(current) => {
            let reconciler = host.reconciler.clone();
            blocking(move || reconciler.delete(&current)).await?;
        }
        // Not recorded as present, but a stray file from a failed Create may remain.
        None => {
            let dest = rec.destination.clone();
            blocking(move || delete_path(&dest)).await?;
        }
    }

    if keep_record {
        host.db.clear_state(id).await?;
        println!("Destroyed {} (record kept)", rec.destination.display());
    } else {
        host.db.remove_resource(id).await?;
        println!("Destroyed {} and removed resource {id}", rec.destination.display());
    }
    Ok(())
}
