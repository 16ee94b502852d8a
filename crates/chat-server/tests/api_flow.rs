use axum::body::{to_bytes, Body};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::Router;
use chat_server::chat::Sweeper;
use chat_server::core::models::{Participant, BROADCAST, LEAVE_TEXT};
use chat_server::core::store::{ChatStore, MemoryStore};
use chat_server::core::{AppState, ChatServerConfig};
use chrono::{TimeDelta, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(ChatServerConfig::default(), store.clone());
    (chat_server::app(state), store)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("user", user);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn register(app: &Router, name: &str) -> StatusCode {
    send(app, "POST", "/participants", None, Some(json!({ "name": name })))
        .await
        .0
}

async fn post_message(app: &Router, from: &str, to: &str, text: &str) -> StatusCode {
    let kind = if to == BROADCAST {
        "message"
    } else {
        "private_message"
    };
    send(
        app,
        "POST",
        "/messages",
        Some(from),
        Some(json!({ "to": to, "text": text, "type": kind })),
    )
    .await
    .0
}

async fn feed(app: &Router, user: Option<&str>, uri: &str) -> Vec<Value> {
    let (status, body) = send(app, "GET", uri, user, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_duplicate_registration_conflicts_once() {
    let (app, _) = test_app();

    assert_eq!(register(&app, "ana").await, StatusCode::CREATED);
    assert_eq!(register(&app, "ana").await, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/participants", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(names, json!([{ "name": "ana" }]));
}

#[tokio::test]
async fn test_invalid_registration_lists_problems() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "POST", "/participants", None, Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let problems: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(problems, vec!["\"name\" is not allowed to be empty"]);
}

#[tokio::test]
async fn test_malformed_json_is_unprocessable() {
    let (app, _) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/participants")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_sender_is_rejected_even_with_valid_body() {
    let (app, store) = test_app();
    register(&app, "ana").await;

    assert_eq!(
        post_message(&app, "ghost", BROADCAST, "boo").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        post_message(&app, "ana", BROADCAST, "oi").await,
        StatusCode::CREATED
    );
    // Join notice plus one message
    assert_eq!(store.list_messages().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_feed_limit_returns_most_recent_visible() {
    let (app, store) = test_app();
    for name in ["ana", "bob", "carol"] {
        register(&app, name).await;
    }
    let before = store.list_messages().await.unwrap().len();

    // Ten messages, four visible to ana: v1..v4
    post_message(&app, "bob", BROADCAST, "v1").await;
    post_message(&app, "bob", "carol", "x1").await;
    post_message(&app, "carol", "bob", "x2").await;
    post_message(&app, "bob", "ana", "v2").await;
    post_message(&app, "carol", "bob", "x3").await;
    post_message(&app, "ana", "carol", "v3").await;
    post_message(&app, "bob", "carol", "x4").await;
    post_message(&app, "carol", "bob", "x5").await;
    post_message(&app, "carol", BROADCAST, "v4").await;
    post_message(&app, "bob", "carol", "x6").await;
    assert_eq!(store.list_messages().await.unwrap().len(), before + 10);

    // Header names are case-insensitive
    let request = Request::builder()
        .uri("/messages?limit=2")
        .header("User", "ana")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let limited: Vec<Value> = serde_json::from_slice(&body).unwrap();
    let texts: Vec<&str> = limited.iter().map(|m| m["text"].as_str().unwrap()).collect();
    assert_eq!(texts, ["v3", "v4"]);

    let all = feed(&app, Some("ana"), "/messages").await;
    assert!(all
        .iter()
        .all(|m| m["to"] == BROADCAST || m["to"] == "ana" || m["from"] == "ana"));
    assert!(all.iter().all(|m| !m["text"].as_str().unwrap().starts_with('x')));

    let (status, _) = send(&app, "GET", "/messages?limit=zero", Some("ana"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_edit_and_delete_ownership() {
    let (app, _) = test_app();
    register(&app, "ana").await;
    register(&app, "bob").await;
    post_message(&app, "ana", BROADCAST, "original").await;

    let messages = feed(&app, Some("ana"), "/messages").await;
    let original = messages
        .iter()
        .find(|m| m["text"] == "original")
        .unwrap();
    let id = original["_id"].as_str().unwrap().to_string();
    let uri = format!("/messages/{}", id);
    let edit = json!({ "to": BROADCAST, "text": "edited", "type": "message" });

    let (status, _) = send(&app, "PUT", &uri, Some("bob"), Some(edit.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let unchanged = feed(&app, Some("ana"), "/messages").await;
    assert!(unchanged.iter().any(|m| m["text"] == "original"));

    let (status, _) = send(&app, "PUT", "/messages/missing", Some("ana"), Some(edit.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PUT", &uri, Some("ana"), Some(edit)).await;
    assert_eq!(status, StatusCode::CREATED);
    let edited = feed(&app, Some("ana"), "/messages").await;
    let edited = edited.iter().find(|m| m["_id"] == id.as_str()).unwrap();
    assert_eq!(edited["text"], "edited");
    assert_eq!(edited["time"], original["time"]);

    let (status, _) = send(&app, "DELETE", "/messages/missing", Some("ana"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "DELETE", &uri, Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);

    let remaining = feed(&app, Some("ana"), "/messages").await;
    assert!(remaining.iter().all(|m| m["_id"] != id.as_str()));
}

#[tokio::test]
async fn test_status_heartbeat() {
    let (app, _) = test_app();
    register(&app, "ana").await;

    let (status, _) = send(&app, "POST", "/status", Some("ghost"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", "/status", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/status", Some("ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    let participant: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(participant["name"], "ana");
    assert!(participant["lastStatus"].is_i64());
}

#[tokio::test]
async fn test_sweep_evicts_idle_participant() {
    let (app, store) = test_app();
    register(&app, "bob").await;
    store
        .insert_participant(&Participant::new("ana", Utc::now() - TimeDelta::seconds(30)))
        .await
        .unwrap();

    let sweeper = Sweeper::new(store.clone(), Duration::from_secs(15), Duration::from_secs(10));
    let evicted = sweeper.sweep(Utc::now()).await.unwrap();
    assert_eq!(evicted, vec!["ana".to_string()]);

    let (_, body) = send(&app, "GET", "/participants", None, None).await;
    let names: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(names, json!([{ "name": "bob" }]));

    let messages = feed(&app, Some("bob"), "/messages").await;
    let last = messages.last().unwrap();
    assert_eq!(last["from"], "ana");
    assert_eq!(last["to"], BROADCAST);
    assert_eq!(last["text"], LEAVE_TEXT);
    assert_eq!(last["type"], "status");
}

#[tokio::test]
async fn test_accented_name_in_utf8_and_latin1_headers() {
    let (app, _) = test_app();
    assert_eq!(register(&app, "José").await, StatusCode::CREATED);

    let encodings: [&[u8]; 2] = ["José".as_bytes(), b"Jos\xE9"];
    for bytes in encodings {
        let request = Request::builder()
            .method("POST")
            .uri("/status")
            .header("user", HeaderValue::from_bytes(bytes).unwrap())
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .method("POST")
            .uri("/messages")
            .header("user", HeaderValue::from_bytes(bytes).unwrap())
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "to": BROADCAST, "text": "olá", "type": "message" }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let messages = feed(&app, Some("José"), "/messages").await;
    assert_eq!(messages.iter().filter(|m| m["from"] == "José").count(), 3);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}
