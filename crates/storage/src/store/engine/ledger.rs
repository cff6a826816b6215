#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{Connection, params};

/// History ledger: one row per applied change set. External schema consumers
/// must never write to it. `change_set_id` stores the decimal version key;
/// ordering is always computed in Rust after parsing, never by TEXT collation.
pub(super) const HISTORY_TABLE_SQL: &str = r#"
        CREATE TABLE IF NOT EXISTS schema_history (
          change_set_id TEXT PRIMARY KEY,
          applied_at_ms INTEGER NOT NULL
        );
"#;

pub(super) fn ensure_history_table(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(HISTORY_TABLE_SQL)?;
    Ok(())
}

/// All applied version keys, ascending.
pub(super) fn applied_ids(conn: &Connection) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare("SELECT change_set_id FROM schema_history")?;
    let mut rows = stmt.query([])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let raw: String = row.get(0)?;
        let id = raw.parse::<i64>().map_err(|_| StoreError::OrderingViolation {
            detail: format!("ledger entry {raw:?} is not a numeric change set id"),
        })?;
        ids.push(id);
    }
    ids.sort_unstable();
    Ok(ids)
}

pub(super) fn record_applied(
    conn: &Connection,
    change_set_id: i64,
    applied_at_ms: i64,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO schema_history(change_set_id, applied_at_ms) VALUES (?1, ?2)",
        params![change_set_id.to_string(), applied_at_ms],
    )?;
    Ok(())
}

pub(super) fn remove_applied(conn: &Connection, change_set_id: i64) -> Result<bool, StoreError> {
    let deleted = conn.execute(
        "DELETE FROM schema_history WHERE change_set_id = ?1",
        params![change_set_id.to_string()],
    )?;
    Ok(deleted > 0)
}
