//! User Account Tests

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_user_via_api() {
    let app = TestApp::new();

    let resp = app
        .post_json(
            "/users",
            json!({
                "handle": "margot",
                "display_name": "Margot",
                "bio": "writes about rivers"
            }),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["handle"].as_str().unwrap(), "margot");
    // the admin flag never leaves the server
    assert!(body.get("is_admin").is_none());

    let id = body["id"].as_str().unwrap().to_string();
    let resp = app.get(&format!("/users/{}", id), None).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_handle_conflicts() {
    let app = TestApp::new();
    app.create_user("taken").await;

    let resp = app
        .post_json(
            "/users",
            json!({ "handle": "taken", "display_name": "Second" }),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_message(), "handle already taken");
}

#[tokio::test]
async fn handle_length_validated() {
    let app = TestApp::new();

    let resp = app
        .post_json("/users", json!({ "handle": "ab", "display_name": "X" }), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_user_not_found() {
    let app = TestApp::new();

    let resp = app.get(&format!("/users/{}", Uuid::new_v4()), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn garbage_bearer_token_rejected() {
    let app = TestApp::new();

    let resp = app
        .post_json(
            "/posts",
            json!({ "title": "t", "content": "c" }),
            Some("not-a-real-token"),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}
