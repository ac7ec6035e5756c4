use std::fs;
use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;

use gallery_core::{Ledger, UserRecord, Users};
use gallery_engine::{
    entry_from_value, user_from_value, write_atomic, JsonLedgerStore, JsonUserStore, Store,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(gallery_logging::initialize_for_tests);
}

#[test]
fn ledger_survives_a_save_load_cycle() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonLedgerStore::new(dir.path().join("ledger.json"));

    let mut ledger = Ledger::new();
    ledger.record_anonymous_view("a");
    ledger.record_anonymous_view("a");
    let mut alice = UserRecord::default();
    ledger.toggle_heart("a", "alice", &mut alice);
    ledger.upsert("b");

    store.save(&ledger).unwrap();
    let loaded = store.load();

    assert_eq!(loaded, ledger);
    assert_eq!(loaded.get("a").unwrap().hearts(), 1);
}

#[test]
fn missing_file_loads_empty() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonLedgerStore::new(dir.path().join("absent.json"));
    assert!(store.load().is_empty());
}

#[test]
fn malformed_file_falls_back_to_empty() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    fs::write(&path, "{ this is not json").unwrap();

    let store = JsonLedgerStore::new(path);
    assert!(store.load().is_empty());
}

#[test]
fn non_object_root_falls_back_to_empty() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let store = JsonLedgerStore::new(path);
    assert!(store.load().is_empty());
}

#[test]
fn raw_entries_are_coerced_field_by_field() {
    init_logging();
    // Wrong-typed counters repair to zero, memberships to empty.
    let entry = entry_from_value(&json!({
        "views": "twelve",
        "hearts": 99,
        "usersHearted": "bob",
    }));
    assert_eq!(entry.views, 0);
    assert!(entry.hearted_by.is_empty());

    let entry = entry_from_value(&json!({ "views": -3 }));
    assert_eq!(entry.views, 0);

    // The stored heart count is derived from the membership list, so a
    // stale value cannot survive a load.
    let entry = entry_from_value(&json!({
        "views": 7,
        "hearts": 40,
        "usersHearted": ["alice", "bob"],
    }));
    assert_eq!(entry.views, 7);
    assert_eq!(entry.hearts(), 2);
}

#[test]
fn raw_users_are_coerced_field_by_field() {
    init_logging();
    let user = user_from_value(&json!({
        "email": 42,
        "viewed": ["a", 7, "b"],
        "hearted": null,
    }));
    assert_eq!(user.email, "");
    assert_eq!(user.credential, "");
    let viewed: Vec<&str> = user.viewed.iter().map(String::as_str).collect();
    assert_eq!(viewed, vec!["a", "b"]);
    assert!(user.hearted.is_empty());
}

#[test]
fn users_survive_a_save_load_cycle() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonUserStore::new(dir.path().join("users.json"));

    let mut users = Users::new();
    users.insert(
        "alice".to_string(),
        UserRecord {
            email: "alice@example.com".to_string(),
            credential: "hunter2".to_string(),
            viewed: ["a"].into_iter().map(String::from).collect(),
            hearted: ["a", "b"].into_iter().map(String::from).collect(),
        },
    );

    store.save(&users).unwrap();
    assert_eq!(store.load(), users);
}

#[test]
fn atomic_write_replaces_existing_content() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.html");

    write_atomic(&path, "first").unwrap();
    write_atomic(&path, "second").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "second");
}
