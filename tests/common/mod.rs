#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use encre::app::auth::AccessTokens;
use encre::app::presence::PresenceRegistry;
use encre::domain::engagement::{Comment, Like, Repost};
use encre::domain::post::{Post, PostVisibility};
use encre::domain::social_graph::Follow;
use encre::domain::user::User;
use encre::store::memory::MemoryStore;
use encre::store::Store;
use encre::{http, AppState};

// 32-byte test-only key — NOT used in production
const TEST_PASETO_ACCESS_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

// ---------------------------------------------------------------------------
// TestApp — fresh per test; the in-memory store needs no external services
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    tokens: AccessTokens,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub handle: String,
    pub access_token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = AccessTokens::new(TEST_PASETO_ACCESS_KEY, 60);
        let dyn_store: Arc<dyn Store> = store.clone();
        let state = AppState {
            store: dyn_store,
            tokens: tokens.clone(),
            presence: PresenceRegistry::new(),
        };
        let router = http::router(state);
        Self {
            router,
            store,
            tokens,
        }
    }

    // ------------------------------------------------------------------
    // HTTP helpers
    // ------------------------------------------------------------------

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        TestResponse { status, body_bytes }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, None, token).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, Some(body), token).await
    }

    pub async fn patch_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::PATCH, path, Some(body), token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, None, token).await
    }

    // ------------------------------------------------------------------
    // Fixtures — written straight to the store so tests control timestamps
    // ------------------------------------------------------------------

    pub async fn create_user(&self, handle: &str) -> TestUser {
        self.create_user_inner(handle, false).await
    }

    pub async fn create_admin(&self, handle: &str) -> TestUser {
        self.create_user_inner(handle, true).await
    }

    async fn create_user_inner(&self, handle: &str, is_admin: bool) -> TestUser {
        let user = User {
            id: Uuid::new_v4(),
            handle: handle.to_string(),
            display_name: handle.to_string(),
            bio: None,
            avatar_url: None,
            is_admin,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.insert_user(&user).await.expect("insert user");
        let access_token = self.tokens.issue(user.id).expect("issue token");
        TestUser {
            id: user.id,
            handle: user.handle,
            access_token,
        }
    }

    pub async fn seed_post(
        &self,
        author: &TestUser,
        title: &str,
        published_at: Option<OffsetDateTime>,
        visibility: PostVisibility,
        tags: &[&str],
    ) -> Uuid {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: author.id,
            title: title.to_string(),
            content: format!("{} body", title),
            rendered_html: format!("<p>{} body</p>", title),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            visibility,
            is_published: published_at.is_some(),
            published_at,
            archived_at: None,
            view_count: 0,
            created_at: published_at.unwrap_or_else(OffsetDateTime::now_utc),
        };
        self.store.insert_post(&post).await.expect("insert post");
        post.id
    }

    pub async fn seed_repost(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        created_at: OffsetDateTime,
    ) -> Uuid {
        let repost = Repost {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at,
        };
        self.store
            .insert_repost(&repost)
            .await
            .expect("insert repost");
        repost.id
    }

    pub async fn seed_follow(&self, follower_id: Uuid, following_id: Uuid) {
        let follow = Follow {
            follower_id,
            following_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store
            .insert_follow(&follow)
            .await
            .expect("insert follow");
    }

    /// Seeds a like from a synthetic user; engagement counting does not
    /// require the liker to exist.
    pub async fn seed_like(&self, post_id: Uuid) {
        let like = Like {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            post_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.insert_like(&like).await.expect("insert like");
    }

    pub async fn seed_comment(&self, post_id: Uuid, author_id: Uuid, body: &str) {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            body: body.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.store
            .insert_comment(&comment)
            .await
            .expect("insert comment");
    }
}

/// Fixed timestamp for deterministic ordering assertions.
pub fn ts(seconds: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(seconds).expect("valid timestamp")
}

/// Identity of one feed entry: post id plus the repost id when the entry
/// carries repost framing. Distinguishes the original appearance of a post
/// from each of its reposts.
pub fn entry_key(item: &Value) -> (String, Option<String>) {
    let post_id = item["id"].as_str().unwrap_or("").to_string();
    let repost_id = item["repost"]["repost_id"].as_str().map(|s| s.to_string());
    (post_id, repost_id)
}
