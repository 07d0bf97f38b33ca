//! Tests for persisting the refresh token.

mod common;

use common::document;
use serde_json::json;
use spotrs::{
    CredentialStore, Error, JsonFileStore, MemoryStore, REFRESH_TOKEN_KEY, set_refresh_token,
    stored_refresh_token,
};
use tempfile::tempdir;

#[test]
fn test_file_round_trip_preserves_token_and_other_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, r#"{"REFRESHKEY":"old","wifi_ssid":"home","retries":3}"#).unwrap();
    let store = JsonFileStore::new(&path);

    let token = "AQDx-_9/+=é\"quoted\"";
    let mut doc = store.load().unwrap();
    set_refresh_token(&mut doc, token);
    store.save(&doc).unwrap();

    let reloaded = store.load().unwrap();
    assert_eq!(stored_refresh_token(&reloaded), Some(token));
    assert_eq!(reloaded.get("wifi_ssid"), Some(&json!("home")));
    assert_eq!(reloaded.get("retries"), Some(&json!(3)));
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn test_missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("credentials.json"));

    let doc = store.load().unwrap();

    assert!(doc.is_empty());
    assert_eq!(stored_refresh_token(&doc), None);
}

#[test]
fn test_non_object_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = JsonFileStore::new(&path).load().unwrap_err();

    assert!(matches!(err, Error::InvalidCredentialStore(_)));
}

#[test]
fn test_save_replaces_file_without_leftovers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, r#"{"REFRESHKEY":"a-much-longer-old-refresh-token-value"}"#).unwrap();
    let store = JsonFileStore::new(&path);

    store.save(&document(json!({"REFRESHKEY": "R1"}))).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, r#"{"REFRESHKEY":"R1"}"#);
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("credentials.json")]);
}

#[test]
fn test_save_to_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("missing").join("credentials.json"));

    let err = store.save(&document(json!({"REFRESHKEY": "R1"}))).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_empty_or_non_string_token_means_unauthorized() {
    assert_eq!(stored_refresh_token(&document(json!({"REFRESHKEY": ""}))), None);
    assert_eq!(stored_refresh_token(&document(json!({"REFRESHKEY": null}))), None);
    assert_eq!(stored_refresh_token(&document(json!({"other": "x"}))), None);
    assert_eq!(
        stored_refresh_token(&document(json!({REFRESH_TOKEN_KEY: "R1"}))),
        Some("R1")
    );
}

#[test]
fn test_memory_store_round_trip() {
    let store = MemoryStore::with_document(document(json!({"device": "pico"})));

    let mut doc = store.load().unwrap();
    set_refresh_token(&mut doc, "R1");
    store.save(&doc).unwrap();

    assert_eq!(
        store.load().unwrap(),
        document(json!({"device": "pico", "REFRESHKEY": "R1"}))
    );
}
