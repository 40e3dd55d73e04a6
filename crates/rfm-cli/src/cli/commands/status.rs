//! `rfm status` – show all managed resources.

use anyhow::Result;
use rfm_core::state_db::StateDb;

pub async fn run_status(db: &StateDb, json: bool) -> Result<()> {
    let records = db.list_resources().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No managed resources.");
    } else {
        println!("{:<6} {:<8} {:<46} {:<10} {} -> {}", "ID", "STATE", "SHA256", "ETAG", "URL", "DESTINATION");
        for r in records {
            let state = if r.is_present() { "present" } else { "absent" };
            println!(
                "{:<6} {:<8} {:<46} {:<10} {} -> {}",
                r.id,
                state,
                r.identity.as_deref().filter(|v| !v.is_empty()).unwrap_or("-"),
                r.validator.as_deref().filter(|v| !v.is_empty()).unwrap_or("-"),
                r.source_url,
                r.destination.display()
            );
        }
    }
    Ok(())
}
