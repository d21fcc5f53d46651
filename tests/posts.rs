//! Post Lifecycle Tests
//!
//! Creation, publication timestamps, archival, author-only writes, and the
//! uniform not-found contract on single-item reads.

mod common;

use axum::http::StatusCode;
use common::{ts, TestApp};
use encre::domain::post::PostVisibility;
use encre::store::Store;
use serde_json::json;

#[tokio::test]
async fn create_published_post() {
    let app = TestApp::new();
    let author = app.create_user("post_create_author").await;

    let resp = app
        .post_json(
            "/posts",
            json!({
                "title": "Hello",
                "content": "First post",
                "tags": ["Intro", " intro ", "HELLO"],
                "publish": true
            }),
            Some(&author.access_token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["title"].as_str().unwrap(), "Hello");
    assert!(body["published_at"].is_string());
    assert_eq!(body["author"]["id"].as_str().unwrap(), author.id.to_string());
    // tags normalized: lowercase, trimmed, deduplicated
    assert_eq!(
        body["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap().to_string())
            .collect::<Vec<_>>(),
        vec!["intro".to_string(), "hello".to_string()]
    );
}

#[tokio::test]
async fn create_requires_title_and_content() {
    let app = TestApp::new();
    let author = app.create_user("post_req_author").await;

    let resp = app
        .post_json(
            "/posts",
            json!({ "title": "  ", "content": "body" }),
            Some(&author.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post_json("/posts", json!({ "title": "t", "content": "c" }), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_visibility_rejected() {
    let app = TestApp::new();
    let author = app.create_user("post_vis_author").await;

    let resp = app
        .post_json(
            "/posts",
            json!({ "title": "t", "content": "c", "visibility": "secret" }),
            Some(&author.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.error_message(),
        "visibility must be public or followers_only"
    );
}

#[tokio::test]
async fn draft_hidden_from_everyone_but_privileged() {
    let app = TestApp::new();
    let author = app.create_user("post_draft_author").await;
    let admin = app.create_admin("post_draft_admin").await;
    let draft = app
        .seed_post(&author, "draft", None, PostVisibility::Public, &[])
        .await;

    // drafts have no feed presence and no public read, author included
    let resp = app
        .get(&format!("/posts/{}", draft), Some(&author.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let resp = app.get(&format!("/posts/{}", draft), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app
        .get(&format!("/posts/{}", draft), Some(&admin.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn followers_only_read_is_uniform_not_found() {
    let app = TestApp::new();
    let author = app.create_user("post_fo_author").await;
    let follower = app.create_user("post_fo_follower").await;
    let stranger = app.create_user("post_fo_stranger").await;
    app.seed_follow(follower.id, author.id).await;

    let post = app
        .seed_post(
            &author,
            "inner",
            Some(ts(100)),
            PostVisibility::FollowersOnly,
            &[],
        )
        .await;
    let path = format!("/posts/{}", post);

    assert_eq!(app.get(&path, None).await.status, StatusCode::NOT_FOUND);
    let resp = app.get(&path, Some(&stranger.access_token)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    // hidden and absent are indistinguishable
    assert_eq!(resp.error_message(), "post not found");

    assert_eq!(
        app.get(&path, Some(&follower.access_token)).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.get(&path, Some(&author.access_token)).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn first_publish_timestamp_never_moves() {
    let app = TestApp::new();
    let author = app.create_user("post_pub_author").await;
    let draft = app
        .seed_post(&author, "draft", None, PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}", draft);

    let resp = app
        .patch_json(&path, json!({ "publish": true }), Some(&author.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let first_published_at = resp.json()["published_at"].as_str().unwrap().to_string();

    app.patch_json(&path, json!({ "publish": false }), Some(&author.access_token))
        .await;
    let resp = app
        .patch_json(&path, json!({ "publish": true }), Some(&author.access_token))
        .await;

    assert_eq!(
        resp.json()["published_at"].as_str().unwrap(),
        first_published_at
    );
}

#[tokio::test]
async fn update_and_delete_are_author_only() {
    let app = TestApp::new();
    let author = app.create_user("post_own_author").await;
    let other = app.create_user("post_own_other").await;
    let post = app
        .seed_post(&author, "mine", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}", post);

    let resp = app
        .patch_json(&path, json!({ "title": "stolen" }), Some(&other.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_message(), "not your post");

    let resp = app.delete(&path, Some(&other.access_token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .patch_json(&path, json!({ "title": "renamed" }), Some(&author.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["title"].as_str().unwrap(), "renamed");

    let resp = app.delete(&path, Some(&author.access_token)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&path, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_post_writes_return_not_found() {
    let app = TestApp::new();
    let user = app.create_user("post_ghost_user").await;
    let path = format!("/posts/{}", uuid::Uuid::new_v4());

    let resp = app
        .patch_json(&path, json!({ "title": "x" }), Some(&user.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let resp = app.delete(&path, Some(&user.access_token)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn archive_hides_everywhere_except_author_single_read() {
    let app = TestApp::new();
    let author = app.create_user("post_arch_author").await;
    let stranger = app.create_user("post_arch_stranger").await;
    let post = app
        .seed_post(&author, "keep", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}", post);

    let resp = app
        .post_json(
            &format!("/posts/{}/archive", post),
            json!({}),
            Some(&author.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["archived"].as_bool().unwrap(), true);

    // gone from listings and feeds, for the author too
    for token in [None, Some(author.access_token.as_str())] {
        let resp = app.get("/feed", token).await;
        assert_eq!(resp.json().as_array().unwrap().len(), 0);
        let resp = app.get("/posts", token).await;
        assert_eq!(resp.json().as_array().unwrap().len(), 0);
    }

    // single read: author keeps access, others get the uniform not-found
    assert_eq!(
        app.get(&path, Some(&author.access_token)).await.status,
        StatusCode::OK
    );
    assert_eq!(
        app.get(&path, Some(&stranger.access_token)).await.status,
        StatusCode::NOT_FOUND
    );

    // appears in the author's archived listing
    let resp = app.get("/posts/archived", Some(&author.access_token)).await;
    let items = resp.json();
    assert_eq!(items.as_array().unwrap().len(), 1);

    // unarchive restores feed presence
    let resp = app
        .delete(
            &format!("/posts/{}/archive", post),
            Some(&author.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = app.get("/feed", None).await;
    assert_eq!(resp.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn successful_reads_bump_view_count() {
    let app = TestApp::new();
    let author = app.create_user("post_view_author").await;
    let post = app
        .seed_post(&author, "seen", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    let path = format!("/posts/{}", post);

    assert_eq!(app.get(&path, None).await.status, StatusCode::OK);
    assert_eq!(app.get(&path, None).await.status, StatusCode::OK);

    // the increment is fire-and-forget; give it a few polls to land
    let mut observed = 0;
    for _ in 0..50 {
        let stored = app.store.find_post(post).await.unwrap().unwrap();
        observed = stored.view_count;
        if observed >= 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(observed >= 2, "view count never recorded: {}", observed);
}

#[tokio::test]
async fn list_posts_by_author_handle() {
    let app = TestApp::new();
    let author = app.create_user("post_list_author").await;
    let other = app.create_user("post_list_other").await;
    app.seed_post(&author, "a1", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    app.seed_post(&author, "a2", Some(ts(300)), PostVisibility::Public, &[])
        .await;
    app.seed_post(&other, "b1", Some(ts(200)), PostVisibility::Public, &[])
        .await;

    let resp = app.get("/posts?author=post_list_author", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.json();
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 2);
    // newest publication first
    assert_eq!(items[0]["title"].as_str().unwrap(), "a2");
    assert_eq!(items[1]["title"].as_str().unwrap(), "a1");

    let resp = app.get("/posts?author=nobody", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_page_shows_followers_only_posts_to_followers() {
    let app = TestApp::new();
    let author = app.create_user("post_page_author").await;
    let follower = app.create_user("post_page_follower").await;
    let stranger = app.create_user("post_page_stranger").await;
    app.seed_follow(follower.id, author.id).await;

    app.seed_post(&author, "open", Some(ts(100)), PostVisibility::Public, &[])
        .await;
    app.seed_post(
        &author,
        "inner",
        Some(ts(200)),
        PostVisibility::FollowersOnly,
        &[],
    )
    .await;

    let path = format!("/users/{}/posts", author.id);
    let resp = app.get(&path, Some(&follower.access_token)).await;
    assert_eq!(resp.json().as_array().unwrap().len(), 2);

    let resp = app.get(&path, Some(&stranger.access_token)).await;
    let items = resp.json();
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"].as_str().unwrap(), "open");
}
