#![forbid(unsafe_code)]

//! One ballot per user, note and option. Pre-existing duplicates (double
//! delivery over federation, historical races) are collapsed to the most
//! recent row before the index goes in.

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use super::super::unique_index::{NullKeyPolicy, UniqueConstraint};
use rusqlite::Transaction;

const CONSTRAINT: UniqueConstraint = UniqueConstraint {
    table: "poll_votes",
    index_name: "idx_poll_votes_user_note_choice",
    key_columns: &["user_id", "note_id", "choice"],
    // All three key columns are NOT NULL; plain unique semantics.
    null_policy: NullKeyPolicy::NullsDistinct,
};

fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    CONSTRAINT.install(tx)
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    // Deleted duplicate ballots are not restored (declared lossy revert).
    CONSTRAINT.drop_index(tx)
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1696243600000,
        name: "dedupe-poll-votes",
        forward: Forward::Atomic(forward),
        backward: Backward::Atomic(backward),
        slow: false,
    }
}
