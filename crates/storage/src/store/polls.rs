#![forbid(unsafe_code)]

use super::{
    AddPollVoteRequest, CreatePollRequest, PollReconcileOutcome, PollRow, SqliteStore, StoreError,
    validate_id,
};
use rk_core::model::tally_floor;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn create_poll(&mut self, request: CreatePollRequest) -> Result<(), StoreError> {
        validate_id(&request.note_id)?;
        let votes = serde_json::to_string(&request.votes)
            .map_err(|_| StoreError::InvalidInput("unencodable vote tallies"))?;
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE notes SET has_poll = 1 WHERE id = ?1",
            params![request.note_id],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownId);
        }
        tx.execute(
            "INSERT INTO polls(note_id, multiple, votes, voter_count) VALUES (?1, ?2, ?3, ?4)",
            params![
                request.note_id,
                request.multiple as i64,
                votes,
                request.voter_count
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Serving-system write path: records the ballot and bumps the cached
    /// per-option tally in one transaction. A duplicate ballot is rejected
    /// by the unique index installed by `dedupe-poll-votes`.
    pub fn add_poll_vote(&mut self, request: AddPollVoteRequest) -> Result<(), StoreError> {
        validate_id(&request.id)?;
        validate_id(&request.note_id)?;
        validate_id(&request.user_id)?;
        let tx = self.conn.transaction()?;

        let votes_json: Option<String> = tx
            .query_row(
                "SELECT votes FROM polls WHERE note_id = ?1",
                params![request.note_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(votes_json) = votes_json else {
            return Err(StoreError::UnknownId);
        };
        let mut votes: Vec<i64> = serde_json::from_str(&votes_json).unwrap_or_default();
        let Some(tally) = votes.get_mut(request.choice) else {
            return Err(StoreError::InvalidInput("poll choice out of range"));
        };
        *tally += 1;
        let votes = serde_json::to_string(&votes)
            .map_err(|_| StoreError::InvalidInput("unencodable vote tallies"))?;

        tx.execute(
            "INSERT INTO poll_votes(id, note_id, user_id, choice, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.id,
                request.note_id,
                request.user_id,
                request.choice as i64,
                request.created_at_ms
            ],
        )?;
        tx.execute(
            "UPDATE polls SET votes = ?2 WHERE note_id = ?1",
            params![request.note_id, votes],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn poll_state(&self, note_id: &str) -> Result<Option<PollRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT note_id, multiple, votes, voter_count FROM polls WHERE note_id = ?1",
                params![note_id],
                |row| {
                    let votes: String = row.get(2)?;
                    Ok(PollRow {
                        note_id: row.get(0)?,
                        multiple: row.get::<_, i64>(1)? != 0,
                        votes: serde_json::from_str(&votes).unwrap_or_default(),
                        voter_count: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    /// Idempotent repair of the cached voter count.
    ///
    /// Raises the stored value to the highest of its lower bounds: the
    /// tally floor (max per-option tally for multi-choice polls, their sum
    /// for single-choice) and the distinct voters recorded in `poll_votes`.
    /// It never lowers the value, even when detail rows were deleted since the
    /// cache was written (accepted permanent-inflation limitation). A poll
    /// with no stored value is not yet tracked: no-op, absence is not zero.
    ///
    /// Concurrent runs for the same poll both compute the same monotonic
    /// maximum, so either commit order converges.
    pub fn reconcile_poll_voter_count(
        &mut self,
        note_id: &str,
    ) -> Result<PollReconcileOutcome, StoreError> {
        let tx = self.conn.transaction()?;

        let row: Option<(i64, String, Option<i64>)> = tx
            .query_row(
                "SELECT multiple, votes, voter_count FROM polls WHERE note_id = ?1",
                params![note_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let Some((multiple, votes_json, voter_count)) = row else {
            return Err(StoreError::UnknownId);
        };
        let Some(stored) = voter_count else {
            return Ok(PollReconcileOutcome {
                voter_count: None,
                updated: false,
            });
        };

        let votes: Vec<i64> = serde_json::from_str(&votes_json).unwrap_or_default();
        let floor = tally_floor(multiple != 0, &votes);
        let distinct_voters: i64 = tx.query_row(
            "SELECT COUNT(DISTINCT user_id) FROM poll_votes WHERE note_id = ?1",
            params![note_id],
            |row| row.get(0),
        )?;

        let next = stored.max(floor).max(distinct_voters);
        if next > stored {
            tx.execute(
                "UPDATE polls SET voter_count = ?2 WHERE note_id = ?1",
                params![note_id, next],
            )?;
        }
        tx.commit()?;

        Ok(PollReconcileOutcome {
            voter_count: Some(next),
            updated: next > stored,
        })
    }
}
