//! Resource record CRUD, split into reads and writes.

mod read;
mod write;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::path::PathBuf;

use super::types::ResourceRecord;

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, source_url, destination, expected_digest,
        digest_primary, digest_secondary, validator, identity,
        created_at, updated_at
    FROM resources
"#;

fn row_to_record(row: &SqliteRow) -> ResourceRecord {
    let destination: String = row.get("destination");
    ResourceRecord {
        id: row.get("id"),
        source_url: row.get("source_url"),
        destination: PathBuf::from(destination),
        expected_digest: row.get("expected_digest"),
        digest_primary: row.get("digest_primary"),
        digest_secondary: row.get("digest_secondary"),
        validator: row.get("validator"),
        identity: row.get("identity"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Destination as stored in the `destination` column.
fn path_key(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
