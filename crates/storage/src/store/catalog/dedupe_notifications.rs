#![forbid(unsafe_code)]

//! Collapse duplicate notifications. `notifier_id` and `note_id` are NULL
//! for system notifications, and repeated system notifications must collapse
//! too, so this constraint declares NullsNotDistinct.

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use super::super::unique_index::{NullKeyPolicy, UniqueConstraint};
use rusqlite::Transaction;

const CONSTRAINT: UniqueConstraint = UniqueConstraint {
    table: "notifications",
    index_name: "idx_notifications_dedupe",
    key_columns: &["notifiee_id", "notifier_id", "kind", "note_id"],
    null_policy: NullKeyPolicy::NullsNotDistinct,
};

fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    CONSTRAINT.install(tx)
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    CONSTRAINT.drop_index(tx)
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1699031600000,
        name: "dedupe-notifications",
        forward: Forward::Atomic(forward),
        backward: Backward::Atomic(backward),
        slow: false,
    }
}
