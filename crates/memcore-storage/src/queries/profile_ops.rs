//! Append-only profile version history (§3, §4.7). The merge-patch
//! semantics (RFC 7396) live in `memcore-stores`; this module only ever
//! appends a new version and reads the latest one.

use memcore_core::models::ProfileVersion;
use memcore_core::MemcoreResult;
use sqlx::Row as _;

use crate::tenant::Tx;
use crate::to_storage_err;

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<ProfileVersion> {
    Ok(ProfileVersion {
        version: row.try_get("version").map_err(to_storage_err)?,
        document: row.try_get("document").map_err(to_storage_err)?,
        changed_fields: row.try_get("changed_fields").map_err(to_storage_err)?,
        changed_by: row.try_get("changed_by").map_err(to_storage_err)?,
        meta_id: row.try_get("meta_id").map_err(to_storage_err)?,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
    })
}

pub async fn latest(tx: &mut Tx<'_>) -> MemcoreResult<Option<ProfileVersion>> {
    let row = sqlx::query(
        "SELECT version, document, changed_fields, changed_by, meta_id, created_at \
         FROM profile_versions ORDER BY version DESC LIMIT 1",
    )
    .fetch_optional(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

pub async fn append(
    tx: &mut Tx<'_>,
    document: &serde_json::Value,
    changed_fields: &[String],
    changed_by: &str,
    meta_id: uuid::Uuid,
) -> MemcoreResult<ProfileVersion> {
    let next_version = latest(tx).await?.map(|v| v.version + 1).unwrap_or(1);

    let row = sqlx::query(
        "INSERT INTO profile_versions (version, document, changed_fields, changed_by, meta_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, now()) \
         RETURNING version, document, changed_fields, changed_by, meta_id, created_at",
    )
    .bind(next_version)
    .bind(document)
    .bind(changed_fields)
    .bind(changed_by)
    .bind(meta_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn get_version(tx: &mut Tx<'_>, version: i64) -> MemcoreResult<Option<ProfileVersion>> {
    let row = sqlx::query(
        "SELECT version, document, changed_fields, changed_by, meta_id, created_at \
         FROM profile_versions WHERE version = $1",
    )
    .bind(version)
    .fetch_optional(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}
