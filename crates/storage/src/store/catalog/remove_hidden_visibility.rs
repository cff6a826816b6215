#![forbid(unsafe_code)]

//! Remove the `hidden` visibility level.
//!
//! Rows still holding `hidden` become `specified` with empty recipient and
//! mention lists, the closest semantics the remaining domain offers. The
//! fixup runs strictly before the domain narrows.

use super::super::StoreError;
use super::super::engine::{Backward, ChangeSet, Forward};
use super::super::enum_rewrite::EnumRewrite;
use rusqlite::Transaction;

// Shape of `notes` as of this change set: `geo` still present,
// `attachment_count` not yet added.
const CREATE_WITHOUT_HIDDEN: &str = r#"
        CREATE TABLE notes (
          id TEXT PRIMARY KEY,
          user_id TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          text TEXT,
          reply_target_id TEXT,
          renote_target_id TEXT,
          has_poll INTEGER NOT NULL DEFAULT 0,
          visibility TEXT NOT NULL DEFAULT 'public'
            CHECK (visibility IN ('public', 'home', 'followers', 'specified')),
          visible_user_ids TEXT NOT NULL DEFAULT '[]',
          mentions TEXT NOT NULL DEFAULT '[]',
          geo TEXT
        );
"#;

const CREATE_WITH_HIDDEN: &str = r#"
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
"#;

const REWRITE: EnumRewrite = EnumRewrite {
    table: "notes",
    column: "visibility",
    removed_value: "hidden",
    fallback_value: "specified",
    cleared_list_columns: &["visible_user_ids", "mentions"],
    copy_columns: &[
        "id",
        "user_id",
        "created_at_ms",
        "text",
        "reply_target_id",
        "renote_target_id",
        "has_poll",
        "visibility",
        "visible_user_ids",
        "mentions",
        "geo",
    ],
    create_with_new_domain: CREATE_WITHOUT_HIDDEN,
    create_with_old_domain: CREATE_WITH_HIDDEN,
    recreate_index_sql: &[
        "CREATE INDEX IF NOT EXISTS idx_notes_reply_target ON notes(reply_target_id);",
        "CREATE INDEX IF NOT EXISTS idx_notes_renote_target ON notes(renote_target_id);",
    ],
};

fn forward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    REWRITE.apply(tx)
}

fn backward(tx: &Transaction<'_>) -> Result<(), StoreError> {
    REWRITE.revert(tx)
}

pub(super) fn change_set() -> ChangeSet {
    ChangeSet {
        id: 1693551600000,
        name: "remove-hidden-visibility",
        forward: Forward::Atomic(forward),
        backward: Backward::Atomic(backward),
        slow: true,
    }
}
