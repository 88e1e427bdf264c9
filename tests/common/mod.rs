//! Common Test Utilities
//!
//! An in-memory application driven through `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use room_chat::config::Settings;
use room_chat::startup::{build_router, AppState};

/// Test application over in-memory stores and local fan-out
pub struct TestApp {
    pub router: Router,
}

/// Status plus parsed JSON body (`Value::Null` for an empty body)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let settings = Settings::in_memory().expect("in-memory settings");
        Self {
            router: build_router(AppState::in_memory(settings)),
        }
    }

    /// Send a request, optionally as `user` and with a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder
                .header("x-username", user)
                .header("x-nickname", nickname(user));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Create a room as `creator` and return its id.
    pub async fn create_room(&self, creator: &str, max_participants: i32) -> i64 {
        let response = self
            .post(
                "/api/v1/rooms",
                creator,
                json!({
                    "title": format!("{creator}'s room"),
                    "subject": "testing",
                    "meetingDate": "2026-11-01T19:00:00Z",
                    "maxParticipants": max_participants,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }

    pub async fn join(&self, room_id: i64, user: &str) -> TestResponse {
        self.post(&format!("/api/v1/rooms/{room_id}/members"), user, json!({}))
            .await
    }

    pub async fn say(&self, room_id: i64, user: &str, body: &str) -> TestResponse {
        self.post(
            &format!("/api/v1/rooms/{room_id}/messages"),
            user,
            json!({ "body": body }),
        )
        .await
    }
}

fn nickname(user: &str) -> String {
    let mut chars = user.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
