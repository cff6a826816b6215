#![forbid(unsafe_code)]

//! The shipped change-set catalog, ascending by version key.
//!
//! Each module is one frozen change set: its DDL reflects the schema shape
//! at that point in history, not the final shape. Shipped bodies are never
//! edited; evolution only appends.

mod add_attachment_count;
mod add_thread_indexes;
mod backfill_attachment_counts;
mod create_base_tables;
mod dedupe_notifications;
mod dedupe_poll_votes;
mod drop_note_geo;
mod remove_hidden_visibility;

use super::engine::ChangeSet;

pub fn all() -> Vec<ChangeSet> {
    vec![
        create_base_tables::change_set(),
        add_thread_indexes::change_set(),
        remove_hidden_visibility::change_set(),
        dedupe_poll_votes::change_set(),
        dedupe_notifications::change_set(),
        add_attachment_count::change_set(),
        backfill_attachment_counts::change_set(),
        drop_note_geo::change_set(),
    ]
}
