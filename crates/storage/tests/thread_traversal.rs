#![forbid(unsafe_code)]

use rk_core::model::Visibility;
use rk_storage::{
    AttachFileRequest, CreateNoteRequest, CreateUserRequest, NoteThreadRequest, SqliteStore,
    StoreError,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("rk_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn store_with_user(test_name: &str) -> SqliteStore {
    let mut store = SqliteStore::open(temp_dir(test_name)).expect("open store");
    store
        .create_user(CreateUserRequest {
            id: "u-1".to_string(),
            username: "alice".to_string(),
            host: None,
            created_at_ms: 1000,
        })
        .expect("create user");
    store
}

fn note(
    store: &mut SqliteStore,
    id: &str,
    text: Option<&str>,
    reply_target_id: Option<&str>,
    renote_target_id: Option<&str>,
) {
    store
        .create_note(CreateNoteRequest {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            created_at_ms: 1000,
            text: text.map(str::to_string),
            reply_target_id: reply_target_id.map(str::to_string),
            renote_target_id: renote_target_id.map(str::to_string),
            visibility: Visibility::Public,
            visible_user_ids: Vec::new(),
            mentions: Vec::new(),
        })
        .expect("create note");
}

fn descendant_ids(
    store: &mut SqliteStore,
    start_id: &str,
    max_depth: usize,
    max_breadth: usize,
) -> Vec<String> {
    store
        .note_descendants(NoteThreadRequest {
            start_id: start_id.to_string(),
            max_depth,
            max_breadth,
        })
        .expect("resolve descendants")
        .into_iter()
        .map(|note| note.id)
        .collect()
}

#[test]
fn collects_replies_and_content_bearing_renotes() {
    let mut store = store_with_user("collects_replies_and_content_bearing_renotes");
    note(&mut store, "n-a", Some("root"), None, None);
    note(&mut store, "n-b", Some("reply"), Some("n-a"), None);
    note(&mut store, "n-c", Some("nested"), Some("n-b"), None);
    // A quote renote carries text; a pure boost does not.
    note(&mut store, "n-q", Some("quote"), None, Some("n-a"));
    note(&mut store, "n-r", None, None, Some("n-a"));

    let ids = descendant_ids(&mut store, "n-a", 5, 10);
    assert_eq!(ids, vec!["n-b", "n-q", "n-c"]);
}

#[test]
fn renote_with_attachment_counts_as_content() {
    let mut store = store_with_user("renote_with_attachment_counts_as_content");
    note(&mut store, "n-a", Some("root"), None, None);
    note(&mut store, "n-r", None, None, Some("n-a"));
    store
        .attach_file(AttachFileRequest {
            id: "f-1".to_string(),
            note_id: "n-r".to_string(),
            file_url: "https://files.example/f".to_string(),
            created_at_ms: 1001,
        })
        .expect("attach file");

    let ids = descendant_ids(&mut store, "n-a", 5, 10);
    assert_eq!(ids, vec!["n-r"]);
}

#[test]
fn pure_renote_blocks_its_subtree() {
    let mut store = store_with_user("pure_renote_blocks_its_subtree");
    note(&mut store, "n-a", Some("root"), None, None);
    note(&mut store, "n-r", None, None, Some("n-a"));
    // A reply hanging off the boost is unreachable once the boost is cut.
    note(&mut store, "n-d", Some("reply to boost"), Some("n-r"), None);

    let ids = descendant_ids(&mut store, "n-a", 5, 10);
    assert!(ids.is_empty(), "got {ids:?}");
}

#[test]
fn depth_bound_stops_the_walk() {
    let mut store = store_with_user("depth_bound_stops_the_walk");
    note(&mut store, "n-a", Some("root"), None, None);
    note(&mut store, "n-b", Some("1"), Some("n-a"), None);
    note(&mut store, "n-c", Some("2"), Some("n-b"), None);
    note(&mut store, "n-d", Some("3"), Some("n-c"), None);

    assert_eq!(descendant_ids(&mut store, "n-a", 1, 10), vec!["n-b"]);
    assert_eq!(
        descendant_ids(&mut store, "n-a", 2, 10),
        vec!["n-b", "n-c"]
    );
    assert!(descendant_ids(&mut store, "n-a", 0, 10).is_empty());
}

#[test]
fn breadth_cap_applies_per_parent_not_globally() {
    let mut store = store_with_user("breadth_cap_applies_per_parent_not_globally");
    note(&mut store, "n-a", Some("root"), None, None);
    note(&mut store, "n-p1", Some("branch"), Some("n-a"), None);
    note(&mut store, "n-p2", Some("branch"), Some("n-a"), None);
    for parent in ["n-p1", "n-p2"] {
        for child in 1..=3 {
            note(
                &mut store,
                &format!("{parent}-c{child}"),
                Some("leaf"),
                Some(parent),
                None,
            );
        }
    }

    let ids = descendant_ids(&mut store, "n-a", 3, 2);
    // Both branches keep their first two children; the cap never pools
    // across parents.
    assert_eq!(
        ids,
        vec!["n-p1", "n-p2", "n-p1-c1", "n-p1-c2", "n-p2-c1", "n-p2-c2"]
    );
}

#[test]
fn disqualified_children_do_not_consume_breadth() {
    let mut store = store_with_user("disqualified_children_do_not_consume_breadth");
    note(&mut store, "n-a", Some("root"), None, None);
    // The boost sorts before both replies but is skipped without charge.
    note(&mut store, "n-boost", None, None, Some("n-a"));
    note(&mut store, "n-z1", Some("reply"), Some("n-a"), None);
    note(&mut store, "n-z2", Some("reply"), Some("n-a"), None);

    let ids = descendant_ids(&mut store, "n-a", 1, 2);
    assert_eq!(ids, vec!["n-z1", "n-z2"]);
}

#[test]
fn reply_cycles_terminate() {
    let mut store = store_with_user("reply_cycles_terminate");
    // Federated data can arrive malformed; the walk must still terminate.
    note(&mut store, "n-x", Some("first"), Some("n-y"), None);
    note(&mut store, "n-y", Some("second"), Some("n-x"), None);

    let ids = descendant_ids(&mut store, "n-x", 10, 10);
    assert_eq!(ids, vec!["n-y"]);
}

#[test]
fn missing_start_note_is_an_unknown_id() {
    let mut store = store_with_user("missing_start_note_is_an_unknown_id");
    let err = store
        .note_descendants(NoteThreadRequest {
            start_id: "n-missing".to_string(),
            max_depth: 3,
            max_breadth: 10,
        })
        .expect_err("start note does not exist");
    assert!(matches!(err, StoreError::UnknownId));
}
