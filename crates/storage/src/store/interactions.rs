#![forbid(unsafe_code)]

use super::{AddNotificationRequest, AddReactionRequest, SqliteStore, StoreError, validate_id};
use rusqlite::params;

impl SqliteStore {
    pub fn add_reaction(&mut self, request: AddReactionRequest) -> Result<(), StoreError> {
        validate_id(&request.id)?;
        validate_id(&request.note_id)?;
        validate_id(&request.user_id)?;
        if request.reaction.is_empty() {
            return Err(StoreError::InvalidInput("empty reaction"));
        }
        self.conn.execute(
            "INSERT INTO reactions(id, note_id, user_id, reaction, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.id,
                request.note_id,
                request.user_id,
                request.reaction,
                request.created_at_ms
            ],
        )?;
        Ok(())
    }

    /// Duplicate notifications (same notifiee, notifier, kind and note,
    /// with NULLs comparing equal) are rejected by `dedupe-notifications`.
    pub fn add_notification(&mut self, request: AddNotificationRequest) -> Result<(), StoreError> {
        validate_id(&request.id)?;
        validate_id(&request.notifiee_id)?;
        if let Some(notifier) = request.notifier_id.as_deref() {
            validate_id(notifier)?;
        }
        if request.kind.is_empty() {
            return Err(StoreError::InvalidInput("empty notification kind"));
        }
        self.conn.execute(
            "INSERT INTO notifications(id, notifiee_id, notifier_id, kind, note_id, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.id,
                request.notifiee_id,
                request.notifier_id,
                request.kind,
                request.note_id,
                request.created_at_ms
            ],
        )?;
        Ok(())
    }
}
