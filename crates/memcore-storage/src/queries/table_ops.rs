//! The dynamic Table store (§3, §4.7): agent-defined tables created on
//! first write, schema-on-write. Every physical table gets the same five
//! standard columns plus a `fields` JSONB bag for whatever the agent sent.

use chrono::Utc;
use memcore_core::models::TableRow;
use memcore_core::{MemcoreError, MemcoreResult};
use sqlx::Row as _;

use crate::sandbox::validate_identifier;
use crate::tenant::Tx;
use crate::to_storage_err;

fn from_row(table_name: &str, row: sqlx::postgres::PgRow) -> MemcoreResult<TableRow> {
    let fields: serde_json::Value = row.try_get("fields").map_err(to_storage_err)?;
    let fields = fields.as_object().cloned().unwrap_or_default();
    Ok(TableRow {
        id: row.try_get("id").map_err(to_storage_err)?,
        table_name: table_name.to_string(),
        fields,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
        updated_at: row.try_get("updated_at").map_err(to_storage_err)?,
        deleted_at: row.try_get("deleted_at").map_err(to_storage_err)?,
        meta_id: row.try_get("meta_id").map_err(to_storage_err)?,
    })
}

/// Create the physical table if this is the first write to `table_name`,
/// and register it in `_table_registry`. Idempotent.
pub async fn ensure_table(tx: &mut Tx<'_>, table_name: &str) -> MemcoreResult<()> {
    validate_identifier(table_name).map_err(MemcoreError::SqlSandbox)?;

    let ddl = format!(
        r#"CREATE TABLE IF NOT EXISTS "{table_name}" (
             id UUID PRIMARY KEY,
             fields JSONB NOT NULL DEFAULT '{{}}'::jsonb,
             meta_id UUID,
             created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
             updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
             deleted_at TIMESTAMPTZ
           )"#
    );
    sqlx::query(&ddl).execute(&mut **tx).await.map_err(to_storage_err)?;

    sqlx::query(
        "INSERT INTO _table_registry (table_name, columns, record_count, created_at) \
         VALUES ($1, '{}'::jsonb, 0, now()) \
         ON CONFLICT (table_name) DO NOTHING",
    )
    .bind(table_name)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    Ok(())
}

pub async fn insert_row(
    tx: &mut Tx<'_>,
    table_name: &str,
    fields: &serde_json::Value,
    meta_id: Option<uuid::Uuid>,
) -> MemcoreResult<TableRow> {
    validate_identifier(table_name).map_err(MemcoreError::SqlSandbox)?;
    ensure_table(tx, table_name).await?;

    let id = uuid::Uuid::new_v4();
    let sql = format!(
        r#"INSERT INTO "{table_name}" (id, fields, meta_id, created_at, updated_at)
           VALUES ($1, $2, $3, now(), now())
           RETURNING id, fields, meta_id, created_at, updated_at, deleted_at"#
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(fields)
        .bind(meta_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    sqlx::query("UPDATE _table_registry SET record_count = record_count + 1 WHERE table_name = $1")
        .bind(table_name)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(table_name, row)
}

pub async fn get_row(
    tx: &mut Tx<'_>,
    table_name: &str,
    id: uuid::Uuid,
) -> MemcoreResult<Option<TableRow>> {
    validate_identifier(table_name).map_err(MemcoreError::SqlSandbox)?;
    let sql = format!(
        r#"SELECT id, fields, meta_id, created_at, updated_at, deleted_at
           FROM "{table_name}" WHERE id = $1 AND deleted_at IS NULL"#
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(|r| from_row(table_name, r)).transpose()
}

pub async fn update_row(
    tx: &mut Tx<'_>,
    table_name: &str,
    id: uuid::Uuid,
    fields: &serde_json::Value,
) -> MemcoreResult<TableRow> {
    validate_identifier(table_name).map_err(MemcoreError::SqlSandbox)?;
    let sql = format!(
        r#"UPDATE "{table_name}" SET fields = fields || $2, updated_at = now()
           WHERE id = $1 AND deleted_at IS NULL
           RETURNING id, fields, meta_id, created_at, updated_at, deleted_at"#
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(fields)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: table_name.to_string(),
            id: id.to_string(),
        })?;

    from_row(table_name, row)
}

pub async fn soft_delete_row(tx: &mut Tx<'_>, table_name: &str, id: uuid::Uuid) -> MemcoreResult<()> {
    validate_identifier(table_name).map_err(MemcoreError::SqlSandbox)?;
    let sql = format!(r#"UPDATE "{table_name}" SET deleted_at = $2 WHERE id = $1"#);
    sqlx::query(&sql)
        .bind(id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    Ok(())
}

pub async fn list_rows(
    tx: &mut Tx<'_>,
    table_name: &str,
    limit: i64,
    offset: i64,
) -> MemcoreResult<Vec<TableRow>> {
    validate_identifier(table_name).map_err(MemcoreError::SqlSandbox)?;
    let sql = format!(
        r#"SELECT id, fields, meta_id, created_at, updated_at, deleted_at
           FROM "{table_name}" WHERE deleted_at IS NULL
           ORDER BY created_at DESC LIMIT $1 OFFSET $2"#
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(|r| from_row(table_name, r)).collect()
}
