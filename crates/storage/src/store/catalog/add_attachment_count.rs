#![forbid(unsafe_code)]

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use rusqlite::Transaction;

// Nullable on purpose: NULL marks a row the backfill has not reached yet.
// Readers treat NULL as 0 until `backfill-attachment-counts` has run.
fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute("ALTER TABLE notes ADD COLUMN attachment_count INTEGER", [])?;
    Ok(())
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute("ALTER TABLE notes DROP COLUMN attachment_count", [])?;
    Ok(())
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1701023600000,
        name: "add-attachment-count",
        forward: Forward::Atomic(forward),
        backward: Backward::Atomic(backward),
        slow: false,
    }
}
