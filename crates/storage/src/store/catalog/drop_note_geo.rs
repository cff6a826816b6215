#![forbid(unsafe_code)]

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use rusqlite::Transaction;

// The geo feature was retired; the column goes with it. Dropping a column
// destroys its data, so there is no backward operation; declared, not
// approximated with an empty recreation.
fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute("ALTER TABLE notes DROP COLUMN geo", [])?;
    Ok(())
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1704304600000,
        name: "drop-note-geo",
        forward: Forward::Atomic(forward),
        backward: Backward::Unsupported,
        slow: false,
    }
}
