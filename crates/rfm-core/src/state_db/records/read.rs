//! Record read operations: list, get, lookup by destination.

use anyhow::Result;
use std::path::Path;

use super::super::db::StateDb;
use super::super::types::{ResourceId, ResourceRecord};
use super::{path_key, row_to_record, SELECT_COLUMNS};

impl StateDb {
    /// List all records, oldest first.
    pub async fn list_resources(&self) -> Result<Vec<ResourceRecord>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    /// Fetch a single record.
    pub async fn get_resource(&self, id: ResourceId) -> Result<Option<ResourceRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    /// Fetch the record managing `destination`, if any.
    pub async fn find_by_destination(&self, destination: &Path) -> Result<Option<ResourceRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE destination = ?1");
        let row = sqlx::query(&sql)
            .bind(path_key(destination))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_record))
    }
}
