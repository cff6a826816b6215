#![forbid(unsafe_code)]

//! Introduce a uniqueness constraint over data that may already violate it.
//!
//! Deduplicates first (deterministically: the highest-id row of each
//! duplicate group survives, and ids are time-ordered so that is the most
//! recent row), then installs the unique index. A constraint failure during
//! the install means the deduplication predicate and the index disagree:
//! an authoring bug surfaced as `ConstraintBuild`, never retried.

use super::StoreError;
use rusqlite::Transaction;

/// Whether rows whose key parts are all NULL conflict with each other.
/// An explicit, declared choice per constraint; there is no default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::store) enum NullKeyPolicy {
    /// NULL key parts never conflict (plain SQLite unique-index semantics).
    NullsDistinct,
    /// NULL key parts compare equal. Emulated with an `IFNULL(col, '')`
    /// expression index; key values must never equal the empty-string
    /// sentinel.
    NullsNotDistinct,
}

pub(in crate::store) struct UniqueConstraint {
    pub table: &'static str,
    pub index_name: &'static str,
    pub key_columns: &'static [&'static str],
    pub null_policy: NullKeyPolicy,
}

impl UniqueConstraint {
    pub fn install(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
        self.dedupe(tx)?;

        let target: Vec<String> = match self.null_policy {
            NullKeyPolicy::NullsDistinct => self
                .key_columns
                .iter()
                .map(|column| (*column).to_string())
                .collect(),
            NullKeyPolicy::NullsNotDistinct => self
                .key_columns
                .iter()
                .map(|column| format!("IFNULL({column}, '')"))
                .collect(),
        };
        tx.execute(
            &format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
                self.index_name,
                self.table,
                target.join(", ")
            ),
            [],
        )
        .map_err(|err| {
            if is_constraint_violation(&err) {
                StoreError::ConstraintBuild {
                    index: self.index_name,
                    cause: Box::new(StoreError::Sql(err)),
                }
            } else {
                StoreError::Sql(err)
            }
        })?;
        Ok(())
    }

    /// Deleted duplicates are not restored on revert (declared lossy).
    pub fn drop_index(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
        tx.execute(&format!("DROP INDEX IF EXISTS {}", self.index_name), [])?;
        Ok(())
    }

    fn dedupe(&self, tx: &Transaction<'_>) -> Result<usize, StoreError> {
        let group_by = self.key_columns.join(", ");
        let deleted = match self.null_policy {
            // GROUP BY already treats NULLs as equal, which is exactly the
            // NullsNotDistinct duplicate grouping.
            NullKeyPolicy::NullsNotDistinct => tx.execute(
                &format!(
                    "DELETE FROM {table} WHERE id NOT IN \
                     (SELECT MAX(id) FROM {table} GROUP BY {group_by})",
                    table = self.table,
                ),
                [],
            )?,
            // Rows with a NULL key part never conflict, so they are exempt
            // from deduplication entirely.
            NullKeyPolicy::NullsDistinct => {
                let all_present = self
                    .key_columns
                    .iter()
                    .map(|column| format!("{column} IS NOT NULL"))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                tx.execute(
                    &format!(
                        "DELETE FROM {table} WHERE {all_present} AND id NOT IN \
                         (SELECT MAX(id) FROM {table} WHERE {all_present} GROUP BY {group_by})",
                        table = self.table,
                    ),
                    [],
                )?
            }
        };
        Ok(deleted)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
