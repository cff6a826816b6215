#![forbid(unsafe_code)]

//! Backfill `notes.attachment_count` from the `note_files` detail rows.
//!
//! Non-atomic: the table is live and may hold tens of millions of rows, so
//! this runs in small predicate-scoped batches outside any transaction
//! (`attachment_count IS NULL` means "not yet migrated"). Interrupting it
//! mid-run is safe; the next run resumes where the predicate left off and
//! converges to the same end state.

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use rusqlite::{Connection, Transaction, params};

const BATCH_SIZE: i64 = 500;

fn forward(conn: &Connection, progress: &mut dyn FnMut(&str)) -> Result<(), StoreError> {
    let mut total: u64 = 0;
    loop {
        let changed = conn.execute(
            "UPDATE notes SET attachment_count = \
               (SELECT COUNT(*) FROM note_files WHERE note_files.note_id = notes.id) \
             WHERE id IN \
               (SELECT id FROM notes WHERE attachment_count IS NULL ORDER BY id LIMIT ?1)",
            params![BATCH_SIZE],
        )?;
        if changed == 0 {
            break;
        }
        total += changed as u64;
        progress(&format!(
            "backfill-attachment-counts: {total} notes backfilled"
        ));
    }
    Ok(())
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute("UPDATE notes SET attachment_count = NULL", [])?;
    Ok(())
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1701024600000,
        name: "backfill-attachment-counts",
        forward: Forward::NonAtomic(forward),
        backward: Backward::Atomic(backward),
        slow: true,
    }
}
