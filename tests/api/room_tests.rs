//! Room API Tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_create_room_joins_creator() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    let detail = app.get(&format!("/api/v1/rooms/{room_id}"), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["creator"], "alice");
    assert_eq!(detail.body["creatorNickname"], "Alice");
    assert_eq!(detail.body["participantCount"], 1);
    assert_eq!(detail.body["lastMessageSeq"], 0);

    let mine = app.get("/api/v1/users/me/rooms", Some("alice")).await;
    assert_eq!(mine.body["roomIds"], json!([room_id]));
}

#[tokio::test]
async fn test_create_room_requires_identity() {
    let app = TestApp::new();

    let response = app
        .request(
            Method::POST,
            "/api/v1/rooms",
            None,
            Some(json!({
                "title": "t",
                "meetingDate": "2026-11-01T19:00:00Z",
                "maxParticipants": 2
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_rejects_invalid_body() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/v1/rooms",
            "alice",
            json!({
                "title": "",
                "meetingDate": "2026-11-01T19:00:00Z",
                "maxParticipants": 0
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_room_and_bad_id() {
    let app = TestApp::new();

    let missing = app.get("/api/v1/rooms/999", None).await;
    let bad = app.get("/api/v1/rooms/abc", None).await;

    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_is_idempotent() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    let first = app.join(room_id, "bob").await;
    let second = app.join(room_id, "bob").await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["joined"], true);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["joined"], false);

    let detail = app.get(&format!("/api/v1/rooms/{room_id}"), None).await;
    assert_eq!(detail.body["participantCount"], 2);
}

#[tokio::test]
async fn test_capacity_kick_and_ban() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 2).await;

    assert_eq!(app.join(room_id, "bob").await.status, StatusCode::CREATED);

    let full = app.join(room_id, "carol").await;
    assert_eq!(full.status, StatusCode::CONFLICT);
    assert!(full.body["message"].as_str().unwrap().contains("2/2"));

    let kick = app
        .post(
            &format!("/api/v1/rooms/{room_id}/bans"),
            "alice",
            json!({ "username": "bob" }),
        )
        .await;
    assert_eq!(kick.status, StatusCode::NO_CONTENT);

    let rejoin = app.join(room_id, "bob").await;
    assert_eq!(rejoin.status, StatusCode::FORBIDDEN);

    assert_eq!(app.join(room_id, "carol").await.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_only_creator_can_kick() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    app.join(room_id, "bob").await;

    let response = app
        .post(
            &format!("/api/v1/rooms/{room_id}/bans"),
            "bob",
            json!({ "username": "alice" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_participants_exclude_caller() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    app.join(room_id, "bob").await;
    app.join(room_id, "carol").await;

    let response = app
        .get(&format!("/api/v1/rooms/{room_id}/participants"), Some("alice"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let mut names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["username"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["bob", "carol"]);

    let forbidden = app
        .get(&format!("/api/v1/rooms/{room_id}/participants"), Some("bob"))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_last_leave_deletes_room() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    app.join(room_id, "bob").await;

    let bob_leaves = app
        .delete(&format!("/api/v1/rooms/{room_id}/members/me"), "bob")
        .await;
    assert_eq!(bob_leaves.body["outcome"], "LEFT");

    let again = app
        .delete(&format!("/api/v1/rooms/{room_id}/members/me"), "bob")
        .await;
    assert_eq!(again.body["outcome"], "NOT_MEMBER");

    let alice_leaves = app
        .delete(&format!("/api/v1/rooms/{room_id}/members/me"), "alice")
        .await;
    assert_eq!(alice_leaves.body["outcome"], "ROOM_DELETED");

    let gone = app.get(&format!("/api/v1/rooms/{room_id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_room_requires_creator() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;
    app.join(room_id, "bob").await;

    let by_bob = app.delete(&format!("/api/v1/rooms/{room_id}"), "bob").await;
    assert_eq!(by_bob.status, StatusCode::FORBIDDEN);

    let by_alice = app
        .delete(&format!("/api/v1/rooms/{room_id}"), "alice")
        .await;
    assert_eq!(by_alice.status, StatusCode::NO_CONTENT);

    let mine = app.get("/api/v1/users/me/rooms", Some("bob")).await;
    assert_eq!(mine.body["roomIds"], json!([]));
}

#[tokio::test]
async fn test_update_notice() {
    let app = TestApp::new();
    let room_id = app.create_room("alice", 4).await;

    let updated = app
        .put(
            &format!("/api/v1/rooms/{room_id}/notice"),
            "alice",
            json!({ "notice": "Bring snacks" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["notice"], "Bring snacks");

    let denied = app
        .put(
            &format!("/api/v1/rooms/{room_id}/notice"),
            "bob",
            json!({ "notice": "nope" }),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_rooms_marks_joined() {
    let app = TestApp::new();
    let mine = app.create_room("alice", 4).await;
    let other = app.create_room("bob", 4).await;

    let response = app.get("/api/v1/rooms", Some("alice")).await;

    assert_eq!(response.status, StatusCode::OK);
    let rooms = response.body.as_array().unwrap();
    let joined = |id: i64| {
        rooms
            .iter()
            .find(|r| r["roomId"] == id)
            .map(|r| r["joined"].clone())
            .unwrap()
    };
    assert_eq!(joined(mine), json!(true));
    assert_eq!(joined(other), json!(false));
}
