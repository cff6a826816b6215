#![forbid(unsafe_code)]

mod error;
mod requests;

pub mod catalog;
pub mod engine;

mod enum_rewrite;
mod interactions;
mod notes;
mod polls;
mod threads;
mod unique_index;

pub use error::StoreError;
pub use requests::*;

use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_FILE_NAME: &str = "rookery.db";

#[derive(Clone, Debug)]
pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub created_at_ms: i64,
    pub text: Option<String>,
    pub reply_target_id: Option<String>,
    pub renote_target_id: Option<String>,
    /// NULL in storage means "backfill not yet reached"; read as 0.
    pub attachment_count: i64,
    pub has_poll: bool,
    pub visibility: String,
    pub visible_user_ids: Vec<String>,
    pub mentions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct PollRow {
    pub note_id: String,
    pub multiple: bool,
    pub votes: Vec<i64>,
    pub voter_count: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollReconcileOutcome {
    /// Stored voter count after the run; None when the poll never tracked one.
    pub voter_count: Option<i64>,
    pub updated: bool,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the store and bring its schema up to date by
    /// applying every pending change set. A failed apply aborts the open;
    /// schema and application code are in lock-step, so the hosting process
    /// must refuse to serve traffic on error.
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_progress(storage_dir, &mut |_| {})
    }

    pub fn open_with_progress(
        storage_dir: impl AsRef<Path>,
        progress: &mut dyn FnMut(&str),
    ) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let mut conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            "#,
        )?;

        preflight_gate(&conn)?;
        engine::apply_all(&mut conn, &catalog::all(), progress)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Operator maintenance action: undo the most recently applied change
    /// set. Fails with `NoBackwardSupported` when it declares no inverse.
    pub fn revert_last_change_set(
        &mut self,
        progress: &mut dyn FnMut(&str),
    ) -> Result<Option<i64>, StoreError> {
        engine::revert_last(&mut self.conn, &catalog::all(), progress)
    }

    pub fn applied_change_set_ids(&self) -> Result<Vec<i64>, StoreError> {
        engine::applied_change_set_ids(&self.conn)
    }
}

/// Fail-closed gate: refuse to run change sets against a database that
/// belongs to another application. An empty database is fine; a database
/// containing only our tables (any historical subset) is fine.
fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    let known: BTreeSet<&str> = [
        "schema_history",
        "users",
        "notes",
        "note_files",
        "polls",
        "poll_votes",
        "reactions",
        "notifications",
    ]
    .into_iter()
    .collect();

    if tables.iter().any(|table| !known.contains(table.as_str())) {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: storage contains tables from another application; refusing to run change sets against it",
        ));
    }

    Ok(())
}

pub(in crate::store) const NOTE_SELECT_COLUMNS: &str = "id, user_id, created_at_ms, text, \
     reply_target_id, renote_target_id, IFNULL(attachment_count, 0), has_poll, visibility, \
     visible_user_ids, mentions";

pub(in crate::store) fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NoteRow> {
    let visible_user_ids: String = row.get(9)?;
    let mentions: String = row.get(10)?;
    Ok(NoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at_ms: row.get(2)?,
        text: row.get(3)?,
        reply_target_id: row.get(4)?,
        renote_target_id: row.get(5)?,
        attachment_count: row.get(6)?,
        has_poll: row.get::<_, i64>(7)? != 0,
        visibility: row.get(8)?,
        visible_user_ids: serde_json::from_str(&visible_user_ids).unwrap_or_default(),
        mentions: serde_json::from_str(&mentions).unwrap_or_default(),
    })
}

pub(in crate::store) fn validate_id(value: &str) -> Result<(), StoreError> {
    rk_core::ids::validate_entity_id(value)
        .map_err(|_| StoreError::InvalidInput("malformed entity id"))
}
