#![forbid(unsafe_code)]

use super::{
    NOTE_SELECT_COLUMNS, NoteRow, NoteThreadRequest, SqliteStore, StoreError, note_from_row,
    validate_id,
};
use rusqlite::OptionalExtension;
use std::collections::BTreeSet;

/// A renote with no text, no attachments and no poll is a pure boost.
/// Pure boosts are not part of the conversation and block their subtree.
fn has_independent_content(note: &NoteRow) -> bool {
    note.text.as_deref().is_some_and(|t| !t.is_empty())
        || note.attachment_count > 0
        || note.has_poll
}

impl SqliteStore {
    /// Collect the descendants of a note in breadth-first order, bounded by
    /// `max_depth` levels and `max_breadth` retained children per parent.
    /// The start note itself is not included in the result.
    pub fn note_descendants(
        &mut self,
        request: NoteThreadRequest,
    ) -> Result<Vec<NoteRow>, StoreError> {
        validate_id(&request.start_id)?;

        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM notes WHERE id = ?1",
                [&request.start_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::UnknownId);
        }

        let sql = format!(
            "SELECT {NOTE_SELECT_COLUMNS} FROM notes \
             WHERE reply_target_id = ?1 OR renote_target_id = ?1 \
             ORDER BY id ASC"
        );
        let mut children_stmt = self.conn.prepare(&sql)?;

        let mut out: Vec<NoteRow> = Vec::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();
        visited.insert(request.start_id.clone());
        let mut frontier: Vec<String> = vec![request.start_id.clone()];

        for _depth in 0..request.max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next: Vec<String> = Vec::new();
            for parent_id in &frontier {
                let mut kept = 0usize;
                let mut rows = children_stmt.query([parent_id])?;
                while let Some(row) = rows.next()? {
                    if kept >= request.max_breadth {
                        break;
                    }
                    let note = note_from_row(row)?;
                    let is_reply = note.reply_target_id.as_deref() == Some(parent_id.as_str());
                    if !is_reply && !has_independent_content(&note) {
                        continue;
                    }
                    if !visited.insert(note.id.clone()) {
                        continue;
                    }
                    kept += 1;
                    next.push(note.id.clone());
                    out.push(note);
                }
            }
            frontier = next;
        }

        Ok(out)
    }
}
