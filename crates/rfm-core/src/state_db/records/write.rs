//! Record write operations: add, record/clear actual state, update desired or pin, remove.

use anyhow::Result;

use super::super::db::{unix_timestamp, StateDb};
use super::super::types::ResourceId;
use super::path_key;
use crate::resource::{DesiredState, ProvisionedState};

impl StateDb {
    /// Insert a new record with desired state only (identity NULL).
    /// Fails if another record already manages the same destination.
    pub async fn add_resource(&self, desired: &DesiredState) -> Result<ResourceId> {
        let now = unix_timestamp();
        let row_id = sqlx::query(
            r#"
            INSERT INTO resources (
                source_url, destination, expected_digest,
                digest_primary, digest_secondary, validator, identity,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, NULL, NULL, NULL, NULL, ?4, ?5)
            "#,
        )
        .bind(&desired.source_url)
        .bind(path_key(&desired.destination))
        .bind(&desired.expected_digest)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    /// Store the actual state returned by Create. Identity becomes the primary digest.
    pub async fn record_provisioned(&self, id: ResourceId, state: &ProvisionedState) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE resources
            SET source_url = ?1,
                destination = ?2,
                digest_primary = ?3,
                digest_secondary = ?4,
                validator = ?5,
                identity = ?6,
                updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&state.source_url)
        .bind(path_key(&state.destination))
        .bind(&state.digest_primary)
        .bind(&state.digest_secondary)
        .bind(&state.validator)
        .bind(state.identity())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Forget the actual state (after drift or Delete). Desired state stays.
    pub async fn clear_state(&self, id: ResourceId) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE resources
            SET digest_primary = NULL,
                digest_secondary = NULL,
                validator = NULL,
                identity = NULL,
                updated_at = ?1
            WHERE id = ?2
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the desired attributes. Also clears actual state: a new
    /// source or destination is a different resource instance.
    pub async fn update_desired(&self, id: ResourceId, desired: &DesiredState) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE resources
            SET source_url = ?1,
                destination = ?2,
                expected_digest = ?3,
                digest_primary = NULL,
                digest_secondary = NULL,
                validator = NULL,
                identity = NULL,
                updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&desired.source_url)
        .bind(path_key(&desired.destination))
        .bind(&desired.expected_digest)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Change only the pinned digest. Actual state is kept: the caller has
    /// checked that the recorded content still satisfies the new pin.
    pub async fn set_expected_digest(&self, id: ResourceId, expected: Option<&str>) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE resources
            SET expected_digest = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(expected)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Permanently remove a record.
    ///
    /// File cleanup is handled separately by higher layers.
    pub async fn remove_resource(&self, id: ResourceId) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM resources
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
