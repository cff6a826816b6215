#![forbid(unsafe_code)]

use rk_storage::{catalog, engine};
use rusqlite::{Connection, params};

fn conn_with_prefix(applied: usize) -> Connection {
    let mut conn = Connection::open_in_memory().expect("open in-memory database");
    let catalog = catalog::all();
    engine::apply_all(&mut conn, &catalog[..applied], &mut |_: &str| {}).expect("apply prefix");
    conn
}

fn insert_note(conn: &Connection, id: &str, visibility: &str, recipients: &str, mentions: &str) {
    conn.execute(
        "INSERT INTO notes(id, user_id, created_at_ms, text, reply_target_id, renote_target_id, \
         has_poll, visibility, visible_user_ids, mentions, geo) \
         VALUES (?1, 'u-1', 1000, 'body', NULL, NULL, 0, ?2, ?3, ?4, '{\"lat\":1}')",
        params![id, visibility, recipients, mentions],
    )
    .expect("insert note");
}

#[test]
fn hidden_rows_become_specified_with_cleared_lists() {
    // Up through add-thread-indexes; the old five-level domain still holds.
    let mut conn = conn_with_prefix(2);
    insert_note(&conn, "n-hidden", "hidden", "[\"u-a\"]", "[\"u-b\"]");
    insert_note(&conn, "n-public", "public", "[\"u-a\"]", "[\"u-b\"]");

    engine::apply_all(&mut conn, &catalog::all(), &mut |_: &str| {}).expect("apply rest");

    let (visibility, recipients, mentions, text, created_at_ms): (
        String,
        String,
        String,
        String,
        i64,
    ) = conn
        .query_row(
            "SELECT visibility, visible_user_ids, mentions, text, created_at_ms \
             FROM notes WHERE id = 'n-hidden'",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )
        .expect("read rewritten note");
    assert_eq!(visibility, "specified");
    assert_eq!(recipients, "[]");
    assert_eq!(mentions, "[]");
    // Non-visibility columns survive the rebuild untouched.
    assert_eq!(text, "body");
    assert_eq!(created_at_ms, 1000);

    let (visibility, recipients): (String, String) = conn
        .query_row(
            "SELECT visibility, visible_user_ids FROM notes WHERE id = 'n-public'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("read untouched note");
    assert_eq!(visibility, "public");
    assert_eq!(recipients, "[\"u-a\"]");
}

#[test]
fn narrowed_domain_rejects_hidden() {
    let conn = conn_with_prefix(catalog::all().len());
    let err = conn.execute(
        "INSERT INTO notes(id, user_id, created_at_ms, visibility) \
         VALUES ('n-1', 'u-1', 1000, 'hidden')",
        [],
    );
    assert!(err.is_err(), "CHECK must reject the removed level");

    conn.execute(
        "INSERT INTO notes(id, user_id, created_at_ms, visibility) \
         VALUES ('n-2', 'u-1', 1000, 'specified')",
        [],
    )
    .expect("remaining levels still accepted");
}

#[test]
fn rebuild_recreates_the_thread_indexes() {
    let conn = conn_with_prefix(catalog::all().len());
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' \
             AND name IN ('idx_notes_reply_target', 'idx_notes_renote_target')",
            [],
            |row| row.get(0),
        )
        .expect("query indexes");
    assert_eq!(count, 2);
}

#[test]
fn revert_widens_the_domain_again() {
    // Up through remove-hidden-visibility.
    let mut conn = conn_with_prefix(3);
    conn.execute(
        "INSERT INTO notes(id, user_id, created_at_ms, visibility) \
         VALUES ('n-1', 'u-1', 1000, 'hidden')",
        [],
    )
    .expect_err("narrow domain in force");

    let reverted =
        engine::revert_last(&mut conn, &catalog::all(), &mut |_: &str| {}).expect("revert");
    assert_eq!(reverted, Some(1_693_551_600_000));

    conn.execute(
        "INSERT INTO notes(id, user_id, created_at_ms, visibility) \
         VALUES ('n-1', 'u-1', 1000, 'hidden')",
        [],
    )
    .expect("widened domain accepts hidden again");
}
