#![forbid(unsafe_code)]

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use rusqlite::Transaction;

fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        r#"
        CREATE INDEX idx_notes_reply_target ON notes(reply_target_id);
        CREATE INDEX idx_notes_renote_target ON notes(renote_target_id);
        CREATE INDEX idx_poll_votes_note ON poll_votes(note_id);
        CREATE INDEX idx_notifications_notifiee ON notifications(notifiee_id);
"#,
    )?;
    Ok(())
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        r#"
        DROP INDEX idx_notifications_notifiee;
        DROP INDEX idx_poll_votes_note;
        DROP INDEX idx_notes_renote_target;
        DROP INDEX idx_notes_reply_target;
"#,
    )?;
    Ok(())
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1688811600000,
        name: "add-thread-indexes",
        forward: Forward::Atomic(forward),
        backward: Backward::Atomic(backward),
        slow: false,
    }
}
