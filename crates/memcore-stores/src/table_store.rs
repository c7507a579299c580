//! The dynamic Table store (§4.7): schema-on-write tables with a
//! meta-tracked row per write, write-protection on known system tables.

use memcore_core::models::{is_write_protected, MemoryOrigin, MemoryMeta, SourceRef, SourceType, TableRow};
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_storage::queries::{memory_meta_ops, table_ops};
use memcore_storage::tenant::Tx;

pub struct TableWriteOutcome {
    pub row: TableRow,
    pub meta: MemoryMeta,
}

pub async fn insert_row(
    tx: &mut Tx<'_>,
    table_name: &str,
    fields: &serde_json::Value,
    origin: MemoryOrigin,
) -> MemcoreResult<TableWriteOutcome> {
    reject_if_write_protected(table_name)?;

    let meta = memory_meta_ops::create(
        tx,
        SourceType::Table,
        &SourceRef::Table { table: table_name.to_string(), row_id: uuid::Uuid::nil() },
        origin,
    )
    .await?;

    let row = table_ops::insert_row(tx, table_name, fields, Some(meta.id)).await?;
    Ok(TableWriteOutcome { row, meta })
}

pub struct TableUpdateOutcome {
    pub row: TableRow,
    pub changed_fields: Vec<String>,
    pub reaffirmed_fields: Vec<String>,
}

/// Update an existing row, computing per-field contradiction/mention
/// signals against the row's previous field values. Rejected outright on
/// a write-protected table.
pub async fn update_row(
    tx: &mut Tx<'_>,
    table_name: &str,
    row_id: uuid::Uuid,
    fields: &serde_json::Value,
) -> MemcoreResult<TableUpdateOutcome> {
    reject_if_write_protected(table_name)?;

    let before = table_ops::get_row(tx, table_name, row_id)
        .await?
        .ok_or_else(|| MemcoreError::NotFound { kind: table_name.to_string(), id: row_id.to_string() })?;

    let (changed, reaffirmed) = diff_fields(&before.fields, fields);

    let updated = table_ops::update_row(tx, table_name, row_id, fields).await?;

    if let Some(meta_id) = before.meta_id {
        if !reaffirmed.is_empty() {
            memory_meta_ops::record_access(tx, meta_id).await?;
        }
        if !changed.is_empty() {
            let new_meta = memory_meta_ops::create(
                tx,
                SourceType::Table,
                &SourceRef::Table { table: table_name.to_string(), row_id },
                MemoryOrigin::System,
            )
            .await?;
            memory_meta_ops::append_contradiction(tx, new_meta.id, meta_id).await?;
        }
    }

    Ok(TableUpdateOutcome { row: updated, changed_fields: changed, reaffirmed_fields: reaffirmed })
}

pub async fn delete_row(tx: &mut Tx<'_>, table_name: &str, row_id: uuid::Uuid) -> MemcoreResult<()> {
    reject_if_write_protected(table_name)?;
    table_ops::soft_delete_row(tx, table_name, row_id).await
}

fn reject_if_write_protected(table_name: &str) -> MemcoreResult<()> {
    if is_write_protected(table_name) {
        return Err(MemcoreError::Validation(format!("table {table_name} is write-protected")));
    }
    Ok(())
}

/// Compare new field values against the row's previous ones: changed
/// (different, non-null value) vs. reaffirmed (identical value re-sent).
fn diff_fields(
    before: &serde_json::Map<String, serde_json::Value>,
    incoming: &serde_json::Value,
) -> (Vec<String>, Vec<String>) {
    let mut changed = Vec::new();
    let mut reaffirmed = Vec::new();

    let Some(incoming_map) = incoming.as_object() else {
        return (changed, reaffirmed);
    };

    for (key, new_value) in incoming_map {
        match before.get(key) {
            Some(existing) if existing == new_value => reaffirmed.push(key.clone()),
            _ => changed.push(key.clone()),
        }
    }

    (changed, reaffirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn write_protected_tables_are_rejected() {
        assert!(reject_if_write_protected("audit_log").is_err());
        assert!(reject_if_write_protected("meals").is_ok());
    }

    #[test]
    fn diff_fields_splits_changed_from_reaffirmed() {
        let before = json!({"calories": 500, "name": "salad"}).as_object().unwrap().clone();
        let incoming = json!({"calories": 600, "name": "salad"});
        let (changed, reaffirmed) = diff_fields(&before, &incoming);
        assert_eq!(changed, vec!["calories".to_string()]);
        assert_eq!(reaffirmed, vec!["name".to_string()]);
    }
}
