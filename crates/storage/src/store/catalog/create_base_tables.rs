#![forbid(unsafe_code)]

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use rusqlite::Transaction;

// Baseline schema. Note the `hidden` visibility level and the `geo` column:
// both exist here because they existed when this change set shipped; later
// change sets remove them. `attachment_count` does not exist yet.
const SQL: &str = r#"
        CREATE TABLE users (
          id TEXT PRIMARY KEY,
          username TEXT NOT NULL,
          host TEXT,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE notes (
          id TEXT PRIMARY KEY,
          user_id TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          text TEXT,
          reply_target_id TEXT,
          renote_target_id TEXT,
          has_poll INTEGER NOT NULL DEFAULT 0,
          visibility TEXT NOT NULL DEFAULT 'public'
            CHECK (visibility IN ('public', 'home', 'followers', 'specified', 'hidden')),
          visible_user_ids TEXT NOT NULL DEFAULT '[]',
          mentions TEXT NOT NULL DEFAULT '[]',
          geo TEXT
        );

        CREATE TABLE note_files (
          id TEXT PRIMARY KEY,
          note_id TEXT NOT NULL,
          file_url TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE polls (
          note_id TEXT PRIMARY KEY,
          multiple INTEGER NOT NULL DEFAULT 0,
          votes TEXT NOT NULL DEFAULT '[]',
          voter_count INTEGER
        );

        CREATE TABLE poll_votes (
          id TEXT PRIMARY KEY,
          note_id TEXT NOT NULL,
          user_id TEXT NOT NULL,
          choice INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE reactions (
          id TEXT PRIMARY KEY,
          note_id TEXT NOT NULL,
          user_id TEXT NOT NULL,
          reaction TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE notifications (
          id TEXT PRIMARY KEY,
          notifiee_id TEXT NOT NULL,
          notifier_id TEXT,
          kind TEXT NOT NULL,
          note_id TEXT,
          created_at_ms INTEGER NOT NULL
        );
"#;

fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(SQL)?;
    Ok(())
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        r#"
        DROP TABLE notifications;
        DROP TABLE reactions;
        DROP TABLE poll_votes;
        DROP TABLE polls;
        DROP TABLE note_files;
        DROP TABLE notes;
        DROP TABLE users;
"#,
    )?;
    Ok(())
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1688720400000,
        name: "create-base-tables",
        forward: Forward::Atomic(forward),
        backward: Backward::Atomic(backward),
        slow: false,
    }
}
