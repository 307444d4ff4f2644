mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use notebox::{
    create_router,
    database::{MemoryStore, NoteStore, StoreError, StoreResult},
    models::{NewNote, Note},
};
use serde_json::json;

use common::*;

#[tokio::test]
async fn alice_and_bob_end_to_end() {
    let (app, _) = memory_app();

    let alice_signup = signup(&app, "alice").await;
    assert_eq!(alice_signup.json["user"]["role"], "admin");
    let alice = login(&app, "alice").await;
    let bob = signup_and_login(&app, "bob").await;

    let note = create_note(&app, &alice, "t", "c").await;
    assert_eq!(note["owner"], "alice");
    let id = note["id"].as_i64().unwrap();

    let resp = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{id}"),
        Some(&bob),
        Some(json!({ "content": "hijacked" })),
    )
    .await;
    assert_eq!(assert_error(&resp, StatusCode::FORBIDDEN), 1003);

    let resp = send(&app, Method::GET, &format!("/api/notes/{id}"), Some(&alice), None).await;
    assert_eq!(resp.json["note"]["content"], "c");

    let resp = send(
        &app,
        Method::DELETE,
        "/api/notes",
        Some(&alice),
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.text);
    assert_eq!(resp.json["deleted"], 1);

    let resp = send(&app, Method::GET, "/api/notes", Some(&alice), None).await;
    assert_eq!(resp.json["notes"], json!([]));
}

#[tokio::test]
async fn owner_is_taken_from_the_credential() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;

    let resp = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(&alice),
        Some(json!({ "content": "mine", "owner": "bob" })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.json["note"]["owner"], "alice");
    assert_eq!(resp.json["note"]["title"], json!(null));
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    let bob = signup_and_login(&app, "bob").await;

    create_note(&app, &alice, "a1", "first").await;
    create_note(&app, &alice, "a2", "second").await;
    create_note(&app, &bob, "b1", "other").await;

    let resp = send(&app, Method::GET, "/api/notes", Some(&alice), None).await;
    let notes = resp.json["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n["owner"] == "alice"));
}

#[tokio::test]
async fn reads_and_deletes_check_ownership() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    let bob = signup_and_login(&app, "bob").await;
    let id = create_note(&app, &alice, "t", "c").await["id"].as_i64().unwrap();

    let read = send(&app, Method::GET, &format!("/api/notes/{id}"), Some(&bob), None).await;
    assert_eq!(assert_error(&read, StatusCode::FORBIDDEN), 1003);

    let delete = send(&app, Method::DELETE, &format!("/api/notes/{id}"), Some(&bob), None).await;
    assert_eq!(assert_error(&delete, StatusCode::FORBIDDEN), 1003);

    let still_there = send(&app, Method::GET, &format!("/api/notes/{id}"), Some(&alice), None).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;

    let missing = send(&app, Method::GET, "/api/notes/999", Some(&alice), None).await;
    assert_eq!(assert_error(&missing, StatusCode::NOT_FOUND), 1004);

    let malformed = send(&app, Method::GET, "/api/notes/abc", Some(&alice), None).await;
    assert_eq!(assert_error(&malformed, StatusCode::BAD_REQUEST), 1000);
}

#[tokio::test]
async fn reading_twice_returns_the_same_note() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    let id = create_note(&app, &alice, "t", "c").await["id"].as_i64().unwrap();

    let uri = format!("/api/notes/{id}");
    let first = send(&app, Method::GET, &uri, Some(&alice), None).await;
    let second = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(first.json["note"], second.json["note"]);
}

#[tokio::test]
async fn update_merges_fields() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    let id = create_note(&app, &alice, "title", "content").await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/notes/{id}");

    let resp = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "title": "", "content": "new content", "archived": true })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.text);
    assert_eq!(resp.json["note"]["title"], "title");
    assert_eq!(resp.json["note"]["content"], "new content");
    assert_eq!(resp.json["note"]["archived"], true);

    let resp = send(&app, Method::PUT, &uri, Some(&alice), Some(json!({ "archived": false }))).await;
    assert_eq!(resp.json["note"]["archived"], false);
    assert_eq!(resp.json["note"]["content"], "new content");
    assert_eq!(resp.json["note"]["owner"], "alice");
}

#[tokio::test]
async fn empty_content_is_rejected() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    let resp = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(&alice),
        Some(json!({ "title": "t", "content": "   " })),
    )
    .await;
    assert_eq!(assert_error(&resp, StatusCode::BAD_REQUEST), 1000);
}

#[tokio::test]
async fn delete_returns_the_removed_note() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    let id = create_note(&app, &alice, "t", "c").await["id"].as_i64().unwrap();
    let uri = format!("/api/notes/{id}");

    let resp = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["note"]["id"], id);

    let gone = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(assert_error(&gone, StatusCode::NOT_FOUND), 1004);
}

#[tokio::test]
async fn bulk_delete_requires_the_password() {
    let (app, _) = memory_app();
    let alice = signup_and_login(&app, "alice").await;
    create_note(&app, &alice, "t", "c").await;

    let resp = send(
        &app,
        Method::DELETE,
        "/api/notes",
        Some(&alice),
        Some(json!({ "password": "Wrong123!" })),
    )
    .await;
    assert_eq!(assert_error(&resp, StatusCode::UNAUTHORIZED), 1002);

    let resp = send(&app, Method::GET, "/api/notes", Some(&alice), None).await;
    assert_eq!(resp.json["notes"].as_array().unwrap().len(), 1);
}

/// Note store whose deletes start failing after a fixed number of successes.
struct FlakyNotes {
    inner: MemoryStore,
    deletes_before_failure: usize,
    deletes: AtomicUsize,
    fail_listing: bool,
}

#[async_trait]
impl NoteStore for FlakyNotes {
    async fn create(&self, note: NewNote) -> StoreResult<Note> {
        NoteStore::create(&self.inner, note).await
    }

    async fn read_by_id(&self, id: i64) -> StoreResult<Note> {
        self.inner.read_by_id(id).await
    }

    async fn read_by_owner(&self, username: &str) -> StoreResult<Vec<Note>> {
        if self.fail_listing {
            return Err(StoreError::Backend("connection reset".into()));
        }
        self.inner.read_by_owner(username).await
    }

    async fn update(&self, note: &Note) -> StoreResult<Note> {
        NoteStore::update(&self.inner, note).await
    }

    async fn delete(&self, note: &Note) -> StoreResult<()> {
        if self.deletes.fetch_add(1, Ordering::SeqCst) >= self.deletes_before_failure {
            return Err(StoreError::Backend("disk full".into()));
        }
        NoteStore::delete(&self.inner, note).await
    }

    async fn rename_owner(&self, from: &str, to: &str) -> StoreResult<u64> {
        self.inner.rename_owner(from, to).await
    }

    async fn verify_owner_password(&self, username: &str, password: &str) -> StoreResult<bool> {
        self.inner.verify_owner_password(username, password).await
    }
}

fn flaky_app(deletes_before_failure: usize, fail_listing: bool) -> (axum::Router, MemoryStore) {
    let store = MemoryStore::new();
    let notes = FlakyNotes {
        inner: store.clone(),
        deletes_before_failure,
        deletes: AtomicUsize::new(0),
        fail_listing,
    };
    let state = state_with(Arc::new(store.clone()), Arc::new(notes));
    (create_router(state), store)
}

#[tokio::test]
async fn failed_bulk_delete_is_partial_with_one_error_body() {
    let (app, store) = flaky_app(2, false);
    let alice = signup_and_login(&app, "alice").await;
    for i in 0..4 {
        create_note(&app, &alice, "t", &format!("note {i}")).await;
    }

    let resp = send(
        &app,
        Method::DELETE,
        "/api/notes",
        Some(&alice),
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(assert_error(&resp, StatusCode::INTERNAL_SERVER_ERROR), 5000);
    assert_eq!(resp.json["msg"], "internal server error");
    assert!(!resp.text.contains("disk full"));

    assert_eq!(store.read_by_owner("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn store_failure_on_listing_is_a_single_error() {
    let (app, _) = flaky_app(usize::MAX, true);
    let alice = signup_and_login(&app, "alice").await;

    let resp = send(&app, Method::GET, "/api/notes", Some(&alice), None).await;
    assert_eq!(assert_error(&resp, StatusCode::INTERNAL_SERVER_ERROR), 5000);
    assert!(resp.json.get("notes").is_none());
}
