#![forbid(unsafe_code)]

//! In-place rewrite of an enumerated column's value domain.
//!
//! SQLite has no standalone enum types; an enumerated column is TEXT with a
//! CHECK domain, and changing the domain means rebuilding the table. The
//! rebuild keeps the ordering guarantees that matter: rows holding a value
//! that is about to become invalid are rewritten to the declared fallback
//! (and their dependent list columns cleared) strictly before the shape
//! changes, so the copy into the narrower domain never trips the CHECK.

use super::StoreError;
use rusqlite::{Transaction, params};

pub(in crate::store) struct EnumRewrite {
    pub table: &'static str,
    pub column: &'static str,
    /// Value leaving the domain.
    pub removed_value: &'static str,
    /// Nearest safe replacement for rows still holding `removed_value`.
    pub fallback_value: &'static str,
    /// JSON list columns whose content only made sense under the removed
    /// value; cleared to `[]` together with the fallback rewrite.
    pub cleared_list_columns: &'static [&'static str],
    /// Every column of the table, in declaration order, for the cast-copy.
    pub copy_columns: &'static [&'static str],
    /// CREATE TABLE under the original name with the narrowed domain.
    pub create_with_new_domain: &'static str,
    /// CREATE TABLE under the original name with the original (wider)
    /// domain, for revert.
    pub create_with_old_domain: &'static str,
    /// Indexes follow the renamed table and die with it; recreated after
    /// each rebuild.
    pub recreate_index_sql: &'static [&'static str],
}

impl EnumRewrite {
    pub fn apply(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
        let mut assignments = vec![format!("{} = ?1", self.column)];
        for column in self.cleared_list_columns {
            assignments.push(format!("{column} = '[]'"));
        }
        tx.execute(
            &format!(
                "UPDATE {} SET {} WHERE {} = ?2",
                self.table,
                assignments.join(", "),
                self.column
            ),
            params![self.fallback_value, self.removed_value],
        )?;
        self.rebuild(tx, self.create_with_new_domain)
    }

    /// Widening the domain cannot orphan rows, so no data fixup on revert.
    pub fn revert(&self, tx: &Transaction<'_>) -> Result<(), StoreError> {
        self.rebuild(tx, self.create_with_old_domain)
    }

    fn rebuild(&self, tx: &Transaction<'_>, create_sql: &str) -> Result<(), StoreError> {
        let temp = format!("{}_old_enum", self.table);
        tx.execute(
            &format!("ALTER TABLE {} RENAME TO {temp}", self.table),
            [],
        )?;
        tx.execute_batch(create_sql)?;

        let columns = self.copy_columns.join(", ");
        let select_columns: Vec<String> = self
            .copy_columns
            .iter()
            .map(|column| {
                if *column == self.column {
                    format!("CAST({column} AS TEXT)")
                } else {
                    (*column).to_string()
                }
            })
            .collect();
        tx.execute(
            &format!(
                "INSERT INTO {} ({columns}) SELECT {} FROM {temp}",
                self.table,
                select_columns.join(", ")
            ),
            [],
        )?;

        tx.execute(&format!("DROP TABLE {temp}"), [])?;
        for sql in self.recreate_index_sql {
            tx.execute_batch(sql)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    const CREATE_NARROW: &str = r#"
        CREATE TABLE moods (
          id TEXT PRIMARY KEY,
          mood TEXT NOT NULL CHECK (mood IN ('calm', 'keen')),
          tags TEXT NOT NULL DEFAULT '[]'
        );
"#;

    const CREATE_WIDE: &str = r#"
        CREATE TABLE moods (
          id TEXT PRIMARY KEY,
          mood TEXT NOT NULL CHECK (mood IN ('calm', 'keen', 'grim')),
          tags TEXT NOT NULL DEFAULT '[]'
        );
"#;

    const REWRITE: EnumRewrite = EnumRewrite {
        table: "moods",
        column: "mood",
        removed_value: "grim",
        fallback_value: "calm",
        cleared_list_columns: &["tags"],
        copy_columns: &["id", "mood", "tags"],
        create_with_new_domain: CREATE_NARROW,
        create_with_old_domain: CREATE_WIDE,
        recreate_index_sql: &["CREATE INDEX IF NOT EXISTS idx_moods_mood ON moods(mood);"],
    };

    fn seeded_connection() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(CREATE_WIDE).expect("create wide table");
        conn.execute_batch(
            "INSERT INTO moods(id, mood, tags) VALUES ('a1', 'grim', '[\"x\"]');
             INSERT INTO moods(id, mood, tags) VALUES ('a2', 'keen', '[\"y\"]');",
        )
        .expect("seed rows");
        let tx = conn.transaction().expect("tx");
        REWRITE.apply(&tx).expect("rewrite");
        tx.commit().expect("commit");
        conn
    }

    #[test]
    fn removed_value_rewritten_to_fallback_with_lists_cleared() {
        let conn = seeded_connection();
        let (mood, tags): (String, String) = conn
            .query_row("SELECT mood, tags FROM moods WHERE id='a1'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .expect("read rewritten row");
        assert_eq!(mood, "calm");
        assert_eq!(tags, "[]");
    }

    #[test]
    fn untouched_rows_keep_value_and_lists() {
        let conn = seeded_connection();
        let (mood, tags): (String, String) = conn
            .query_row("SELECT mood, tags FROM moods WHERE id='a2'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .expect("read untouched row");
        assert_eq!(mood, "keen");
        assert_eq!(tags, "[\"y\"]");
    }

    #[test]
    fn narrowed_domain_rejects_removed_value() {
        let conn = seeded_connection();
        let err = conn.execute(
            "INSERT INTO moods(id, mood) VALUES ('a3', 'grim')",
            [],
        );
        assert!(err.is_err(), "narrowed CHECK must reject the removed value");
    }

    #[test]
    fn revert_restores_the_wider_domain() {
        let mut conn = seeded_connection();
        let tx = conn.transaction().expect("tx");
        REWRITE.revert(&tx).expect("revert");
        tx.commit().expect("commit");
        conn.execute("INSERT INTO moods(id, mood) VALUES ('a3', 'grim')", [])
            .expect("wider CHECK accepts the value again");
    }
}
