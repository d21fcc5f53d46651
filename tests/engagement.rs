//! Engagement Tests
//!
//! Like/bookmark/repost toggles, comments, and the presence registry.
//! Interactions with a hidden post read as not-found, same as lookups.

mod common;

use axum::http::StatusCode;
use common::{ts, TestApp};
use encre::domain::post::PostVisibility;
use serde_json::json;

#[tokio::test]
async fn like_toggles_on_and_off() {
    let app = TestApp::new();
    let author = app.create_user("eng_like_author").await;
    let fan = app.create_user("eng_like_fan").await;
    let post = app
        .seed_post(&author, "p", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}/like", post);

    let resp = app.post_json(&path, json!({}), Some(&fan.access_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["liked"].as_bool().unwrap(), true);
    assert_eq!(resp.json()["count"].as_i64().unwrap(), 1);

    let resp = app.post_json(&path, json!({}), Some(&fan.access_token)).await;
    assert_eq!(resp.json()["liked"].as_bool().unwrap(), false);
    assert_eq!(resp.json()["count"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn interactions_with_hidden_posts_read_as_not_found() {
    let app = TestApp::new();
    let author = app.create_user("eng_hidden_author").await;
    let stranger = app.create_user("eng_hidden_stranger").await;
    let post = app
        .seed_post(
            &author,
            "inner",
            Some(ts(100)),
            PostVisibility::FollowersOnly,
            &[],
        )
        .await;

    for action in ["like", "bookmark", "repost", "comments"] {
        let resp = app
            .post_json(
                &format!("/posts/{}/{}", post, action),
                json!({ "body": "hi" }),
                Some(&stranger.access_token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "action={}", action);
        assert_eq!(resp.error_message(), "post not found");
    }
}

#[tokio::test]
async fn bookmark_toggle_and_listing() {
    let app = TestApp::new();
    let author = app.create_user("eng_bm_author").await;
    let reader = app.create_user("eng_bm_reader").await;
    let post = app
        .seed_post(&author, "keeper", Some(ts(100)), PostVisibility::Public, &[])
        .await;

    let resp = app
        .post_json(
            &format!("/posts/{}/bookmark", post),
            json!({}),
            Some(&reader.access_token),
        )
        .await;
    assert_eq!(resp.json()["bookmarked"].as_bool().unwrap(), true);

    let resp = app.get("/bookmarks", Some(&reader.access_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.json();
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_str().unwrap(), post.to_string());
    assert_eq!(items[0]["is_bookmarked"].as_bool().unwrap(), true);

    let resp = app
        .post_json(
            &format!("/posts/{}/bookmark", post),
            json!({}),
            Some(&reader.access_token),
        )
        .await;
    assert_eq!(resp.json()["bookmarked"].as_bool().unwrap(), false);
    let resp = app.get("/bookmarks", Some(&reader.access_token)).await;
    assert_eq!(resp.json().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn repost_toggle_and_user_listing() {
    let app = TestApp::new();
    let author = app.create_user("eng_rp_author").await;
    let sharer = app.create_user("eng_rp_sharer").await;
    let post = app
        .seed_post(&author, "shared", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}/repost", post);

    let resp = app
        .post_json(&path, json!({}), Some(&sharer.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["reposted"].as_bool().unwrap(), true);
    assert_eq!(resp.json()["count"].as_i64().unwrap(), 1);

    let resp = app
        .get(&format!("/users/{}/reposts", sharer.id), None)
        .await;
    let items = resp.json();
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_str().unwrap(), post.to_string());
    assert_eq!(
        items[0]["repost"]["reposter"]["id"].as_str().unwrap(),
        sharer.id.to_string()
    );

    // toggle off deletes the claim
    let resp = app
        .post_json(&path, json!({}), Some(&sharer.access_token))
        .await;
    assert_eq!(resp.json()["reposted"].as_bool().unwrap(), false);
    assert_eq!(resp.json()["count"].as_i64().unwrap(), 0);
    let resp = app
        .get(&format!("/users/{}/reposts", sharer.id), None)
        .await;
    assert_eq!(resp.json().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn comments_create_list_delete() {
    let app = TestApp::new();
    let author = app.create_user("eng_cmt_author").await;
    let reader = app.create_user("eng_cmt_reader").await;
    let post = app
        .seed_post(&author, "talk", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}/comments", post);

    let resp = app
        .post_json(&path, json!({ "body": "first!" }), Some(&reader.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let first_id = resp.json()["id"].as_str().unwrap().to_string();

    app.post_json(&path, json!({ "body": "second" }), Some(&author.access_token))
        .await;

    // oldest first
    let resp = app.get(&path, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let comments = resp.json();
    let comments = comments.as_array().unwrap().clone();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"].as_str().unwrap(), "first!");
    assert_eq!(
        comments[0]["author"]["id"].as_str().unwrap(),
        reader.id.to_string()
    );

    // only the comment's author may delete it
    let resp = app
        .delete(&format!("/comments/{}", first_id), Some(&author.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    let resp = app
        .delete(&format!("/comments/{}", first_id), Some(&reader.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = app.get(&path, None).await;
    assert_eq!(resp.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_comment_rejected() {
    let app = TestApp::new();
    let author = app.create_user("eng_empty_author").await;
    let post = app
        .seed_post(&author, "p", Some(ts(100)), PostVisibility::Public, &[])
        .await;

    let resp = app
        .post_json(
            &format!("/posts/{}/comments", post),
            json!({ "body": "   " }),
            Some(&author.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn presence_counts_distinct_users() {
    let app = TestApp::new();
    let user_a = app.create_user("eng_pres_a").await;
    let user_b = app.create_user("eng_pres_b").await;

    let resp = app.get("/presence/online", None).await;
    assert_eq!(resp.json()["online"].as_i64().unwrap(), 0);

    // two connections for one user still count once
    let first = app
        .post_json("/presence/connections", json!({}), Some(&user_a.access_token))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    let connection = first.json()["connection_id"].as_str().unwrap().to_string();
    app.post_json("/presence/connections", json!({}), Some(&user_a.access_token))
        .await;
    app.post_json("/presence/connections", json!({}), Some(&user_b.access_token))
        .await;

    let resp = app.get("/presence/online", None).await;
    assert_eq!(resp.json()["online"].as_i64().unwrap(), 2);

    let resp = app
        .delete(
            &format!("/presence/connections/{}", connection),
            Some(&user_a.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    // the user's second connection keeps them online
    let resp = app.get("/presence/online", None).await;
    assert_eq!(resp.json()["online"].as_i64().unwrap(), 2);
}
