#![forbid(unsafe_code)]

use super::{
    AttachFileRequest, CreateNoteRequest, CreateUserRequest, NOTE_SELECT_COLUMNS, NoteRow,
    SqliteStore, StoreError, note_from_row, validate_id,
};
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn create_user(&mut self, request: CreateUserRequest) -> Result<(), StoreError> {
        validate_id(&request.id)?;
        self.conn.execute(
            "INSERT INTO users(id, username, host, created_at_ms) VALUES (?1, ?2, ?3, ?4)",
            params![
                request.id,
                request.username,
                request.host,
                request.created_at_ms
            ],
        )?;
        Ok(())
    }

    pub fn create_note(&mut self, request: CreateNoteRequest) -> Result<(), StoreError> {
        validate_id(&request.id)?;
        validate_id(&request.user_id)?;
        if let Some(target) = request.reply_target_id.as_deref() {
            validate_id(target)?;
        }
        if let Some(target) = request.renote_target_id.as_deref() {
            validate_id(target)?;
        }
        let visible_user_ids = serde_json::to_string(&request.visible_user_ids)
            .map_err(|_| StoreError::InvalidInput("unencodable visible_user_ids"))?;
        let mentions = serde_json::to_string(&request.mentions)
            .map_err(|_| StoreError::InvalidInput("unencodable mentions"))?;

        self.conn.execute(
            "INSERT INTO notes(id, user_id, created_at_ms, text, reply_target_id, \
             renote_target_id, has_poll, visibility, visible_user_ids, mentions, \
             attachment_count) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, 0)",
            params![
                request.id,
                request.user_id,
                request.created_at_ms,
                request.text,
                request.reply_target_id,
                request.renote_target_id,
                request.visibility.as_str(),
                visible_user_ids,
                mentions
            ],
        )?;
        Ok(())
    }

    pub fn attach_file(&mut self, request: AttachFileRequest) -> Result<(), StoreError> {
        validate_id(&request.id)?;
        validate_id(&request.note_id)?;
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE notes SET attachment_count = IFNULL(attachment_count, 0) + 1 WHERE id = ?1",
            params![request.note_id],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownId);
        }
        tx.execute(
            "INSERT INTO note_files(id, note_id, file_url, created_at_ms) VALUES (?1, ?2, ?3, ?4)",
            params![
                request.id,
                request.note_id,
                request.file_url,
                request.created_at_ms
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_note(&self, id: &str) -> Result<Option<NoteRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {NOTE_SELECT_COLUMNS} FROM notes WHERE id = ?1"),
                params![id],
                note_from_row,
            )
            .optional()?)
    }
}
