//! Message and Read Status API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

fn seqs(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|m| m["seq"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_send_assigns_gapless_seqs() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    for (i, text) in ["one", "two", "three"].iter().enumerate() {
        let response = app.say(room_id, "alice", text).await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["seq"], i as i64 + 1);
        assert_eq!(response.body["type"], "TALK");
    }

    let detail = app.get(&format!("/api/v1/rooms/{room_id}"), None).await;
    assert_eq!(detail.body["lastMessageSeq"], 3);
}

#[tokio::test]
async fn test_send_rejects_empty_body_and_missing_room() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    let empty = app.say(room_id, "alice", "   ").await;
    let missing = app.say(404, "alice", "hello").await;

    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_pages_newest_first_each_page_ascending() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    for i in 1..=5 {
        app.say(room_id, "alice", &format!("m{i}")).await;
    }

    let first = app
        .get(&format!("/api/v1/rooms/{room_id}/messages?page=0&size=2"), None)
        .await;
    let second = app
        .get(&format!("/api/v1/rooms/{room_id}/messages?page=1&size=2"), None)
        .await;
    let last = app
        .get(&format!("/api/v1/rooms/{room_id}/messages?page=2&size=2"), None)
        .await;

    assert_eq!(seqs(&first.body), vec![4, 5]);
    assert_eq!(seqs(&second.body), vec![2, 3]);
    assert_eq!(seqs(&last.body), vec![1]);
}

#[tokio::test]
async fn test_unread_counts_follow_read_cursor() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    app.join(room_id, "bob").await;
    for text in ["a", "b", "c"] {
        app.say(room_id, "alice", text).await;
    }

    let unread = app.get("/api/v1/users/me/unread", Some("bob")).await;
    assert_eq!(unread.body["totalUnreadCount"], 3);

    let sender = app.get("/api/v1/users/me/unread", Some("alice")).await;
    assert_eq!(sender.body["totalUnreadCount"], 0);

    let read = app
        .put(
            &format!("/api/v1/rooms/{room_id}/read-status"),
            "bob",
            json!({ "lastReadMessageSeq": 2 }),
        )
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["unreadCount"], 1);

    let unread = app.get("/api/v1/users/me/unread", Some("bob")).await;
    assert_eq!(unread.body["totalUnreadCount"], 1);
}

#[tokio::test]
async fn test_read_cursor_for_non_member_is_no_content() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    let response = app
        .put(
            &format!("/api/v1/rooms/{room_id}/read-status"),
            "mallory",
            json!({ "lastReadMessageSeq": 1 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_negative_read_cursor_is_rejected() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    let response = app
        .put(
            &format!("/api/v1/rooms/{room_id}/read-status"),
            "alice",
            json!({ "lastReadMessageSeq": -1 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_banned_and_non_members_cannot_send() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    app.join(room_id, "bob").await;
    assert_eq!(app.say(room_id, "bob", "hello").await.status, StatusCode::CREATED);

    app.post(
        &format!("/api/v1/rooms/{room_id}/bans"),
        "alice",
        json!({ "username": "bob" }),
    )
    .await;

    let banned = app.say(room_id, "bob", "let me back").await;
    let stranger = app.say(room_id, "mallory", "hi all").await;

    assert_eq!(banned.status, StatusCode::FORBIDDEN);
    assert_eq!(stranger.status, StatusCode::FORBIDDEN);
    let detail = app.get(&format!("/api/v1/rooms/{room_id}"), None).await;
    assert_eq!(detail.body["lastMessageSeq"], 1);
}
