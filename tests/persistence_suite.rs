mod common;

use std::fs;

use chrono::{TimeZone, Utc};
use common::{dec, json_store, temp_dir};
use ledgerwise::ledger::{RecordKind, TransactionDraft};
use ledgerwise::storage::{JsonStorage, StorageBackend};
use serde_json::{json, Value};

fn lunch(amount: &str) -> TransactionDraft {
    TransactionDraft {
        description: "Lunch".into(),
        category: "Food & Dining".into(),
        amount: dec(amount),
        date: Some(Utc.with_ymd_and_hms(2025, 6, 3, 12, 0, 0).unwrap()),
    }
}

#[test]
fn failed_atomic_write_keeps_file_and_memory_state() {
    let dir = temp_dir();
    let mut store = json_store(&dir);
    store.add_transaction(lunch("-12")).unwrap();

    let path = dir.join("transactions.json");
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the temp file name makes the write fail.
    fs::create_dir_all(dir.join("transactions.json.tmp")).unwrap();

    let err = store.add_transaction(lunch("-30")).unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(store.transactions().len(), 2);
    assert_eq!(
        fs::read_to_string(&path).expect("read after failure"),
        original,
        "original file should be untouched when the write fails"
    );
}

#[test]
fn unreadable_records_are_skipped_on_open() {
    let dir = temp_dir();
    {
        let mut store = json_store(&dir);
        store.add_transaction(lunch("-12")).unwrap();
    }

    let path = dir.join("transactions.json");
    let mut entries: Vec<Value> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    entries.push(json!({ "id": "not-a-uuid", "amount": "oops" }));
    fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

    let store = json_store(&dir);
    assert_eq!(store.transactions().len(), 1);
    assert_eq!(store.transactions()[0].amount, dec("-12"));
}

#[test]
fn collection_that_is_not_an_array_fails_to_open() {
    let dir = temp_dir();
    fs::write(dir.join("goals.json"), "{\"name\": \"Trip\"}").unwrap();

    let storage = JsonStorage::new(Some(dir.clone())).unwrap();
    let result = ledgerwise::core::LedgerStore::open(Box::new(storage));
    assert!(matches!(result, Err(err) if err.is_persistence()));
}

#[test]
fn backend_assigns_ids_and_merges_partial_updates() {
    let dir = temp_dir();
    let storage = JsonStorage::new(Some(dir.clone())).unwrap();

    let mut document = serde_json::Map::new();
    document.insert("name".into(), json!("Trip"));
    document.insert("currentAmount".into(), json!("10"));
    let created = storage.create(RecordKind::Goal, document).unwrap();
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| uuid::Uuid::parse_str(raw).ok())
        .expect("backend assigns an id");

    let mut partial = serde_json::Map::new();
    partial.insert("currentAmount".into(), json!("25"));
    partial.insert("id".into(), json!("ignored"));
    storage.update(RecordKind::Goal, id, partial).unwrap();

    let stored = storage.load_all(RecordKind::Goal).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["currentAmount"], json!("25"));
    assert_eq!(stored[0]["name"], json!("Trip"));
    assert_eq!(stored[0]["id"], json!(id.to_string()));

    storage.delete(RecordKind::Goal, id).unwrap();
    assert!(storage.delete(RecordKind::Goal, id).is_err());
    assert!(storage.load_all(RecordKind::Goal).unwrap().is_empty());
}
