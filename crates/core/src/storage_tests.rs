// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the storage module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::tempdir;

fn exercise_basic_contract(storage: &dyn Storage) {
    assert_eq!(storage.get("missing").unwrap(), None);

    storage.set("pendingRequests", "[]").unwrap();
    assert_eq!(storage.get("pendingRequests").unwrap().as_deref(), Some("[]"));

    storage.set("pendingRequests", "[1]").unwrap();
    assert_eq!(storage.get("pendingRequests").unwrap().as_deref(), Some("[1]"));

    storage.remove("pendingRequests").unwrap();
    assert_eq!(storage.get("pendingRequests").unwrap(), None);

    // Removing twice is fine.
    storage.remove("pendingRequests").unwrap();
}

#[test]
fn test_memory_storage_contract() {
    exercise_basic_contract(&MemoryStorage::new());
}

#[test]
fn test_file_storage_contract() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path().join("store")).unwrap();
    exercise_basic_contract(&storage);
}

#[test]
fn test_file_storage_keys_round_trip_awkward_names() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();

    storage.set("cache_/budgets?month=2026-10", "{}").unwrap();
    storage.set("cache_/goals/42", "{}").unwrap();
    storage.set("pendingRequests", "[]").unwrap();

    let keys = storage.keys().unwrap();
    assert_eq!(
        keys,
        vec![
            "cache_/budgets?month=2026-10".to_string(),
            "cache_/goals/42".to_string(),
            "pendingRequests".to_string(),
        ]
    );
}

#[test]
fn test_file_storage_accepts_keys_longer_than_a_file_name() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    let key = format!("cache_/transactions?{}", "category=groceries&".repeat(20));
    assert!(key.len() > 300);

    storage.set(&key, r#"{"rows":[]}"#).unwrap();

    assert_eq!(storage.get(&key).unwrap().as_deref(), Some(r#"{"rows":[]}"#));
    assert_eq!(storage.keys().unwrap(), vec![key.clone()]);
    storage.remove(&key).unwrap();
    assert_eq!(storage.get(&key).unwrap(), None);
}

#[test]
fn test_file_storage_names_are_fixed_length() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("a", "1").unwrap();
    storage.set(&"b".repeat(500), "2").unwrap();

    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let name = entry.unwrap().file_name().into_string().unwrap();
        assert_eq!(name.len(), 64 + ".json".len(), "{name}");
    }
}

#[test]
fn test_file_storage_detects_misplaced_record() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("a", "1").unwrap();
    storage.set("b", "2").unwrap();

    // Copy the record for "a" over the file for "b".
    let a = dir.path().join(FileStorage::file_name("a"));
    let b = dir.path().join(FileStorage::file_name("b"));
    std::fs::copy(&a, &b).unwrap();

    assert!(matches!(storage.get("b"), Err(Error::CorruptedData(_))));
    assert_eq!(storage.keys().unwrap(), vec!["a".to_string()]);
}

#[test]
fn test_file_storage_ignores_foreign_and_temp_files() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set("a", "1").unwrap();

    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("zz-not-hex.json"), "{}").unwrap();
    std::fs::write(dir.path().join("61.abc.tmp"), "partial").unwrap();

    assert_eq!(storage.keys().unwrap(), vec!["a".to_string()]);
    assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_file_storage_leaves_no_temp_files_behind() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    for i in 0..5 {
        storage.set("k", &i.to_string()).unwrap();
    }

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_file_storage_persists_across_instances() {
    let dir = tempdir().unwrap();
    {
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("cache_summary", r#"{"total":12}"#).unwrap();
    }
    let storage = FileStorage::open(dir.path()).unwrap();
    assert_eq!(
        storage.get("cache_summary").unwrap().as_deref(),
        Some(r#"{"total":12}"#)
    );
}

#[test]
fn test_json_helpers() {
    let storage = MemoryStorage::new();
    store_json(&storage, "numbers", &vec![1, 2, 3]).unwrap();
    let loaded: Option<Vec<u32>> = load_json(&storage, "numbers").unwrap();
    assert_eq!(loaded, Some(vec![1, 2, 3]));

    let missing: Option<Vec<u32>> = load_json(&storage, "nothing").unwrap();
    assert_eq!(missing, None);

    storage.set("broken", "not json").unwrap();
    let broken: Result<Option<Vec<u32>>> = load_json(&storage, "broken");
    assert!(matches!(broken, Err(Error::Json(_))));
}
