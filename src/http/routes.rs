use axum::{routing::delete, routing::get, routing::patch, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn feed() -> Router<AppState> {
    Router::new()
        .route("/feed", get(handlers::feed))
        .route("/feed/trending/tags", get(handlers::trending_tags))
        .route("/feed/trending/posts", get(handlers::trending_posts))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", post(handlers::create_post))
        .route("/posts", get(handlers::list_posts))
        .route("/posts/archived", get(handlers::list_archived_posts))
        .route("/posts/:id", get(handlers::get_post))
        .route("/posts/:id", patch(handlers::update_post))
        .route("/posts/:id", delete(handlers::delete_post))
        .route("/posts/:id/archive", post(handlers::archive_post))
        .route("/posts/:id/archive", delete(handlers::unarchive_post))
        .route("/posts/:id/like", post(handlers::toggle_like))
        .route("/posts/:id/bookmark", post(handlers::toggle_bookmark))
        .route("/posts/:id/repost", post(handlers::toggle_repost))
        .route("/posts/:id/comments", post(handlers::create_comment))
        .route("/posts/:id/comments", get(handlers::list_comments))
        .route("/comments/:id", delete(handlers::delete_comment))
        .route("/bookmarks", get(handlers::list_bookmarks))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::create_user))
        .route("/users/:id", get(handlers::get_user))
        .route("/users/:id/posts", get(handlers::list_user_posts))
        .route("/users/:id/reposts", get(handlers::list_user_reposts))
        .route("/users/:id/follow", post(handlers::follow_user))
        .route("/users/:id/unfollow", post(handlers::unfollow_user))
        .route("/users/:id/followers", get(handlers::list_followers))
        .route("/users/:id/following", get(handlers::list_following))
}

pub fn presence() -> Router<AppState> {
    Router::new()
        .route("/presence/online", get(handlers::online_count))
        .route("/presence/connections", post(handlers::register_connection))
        .route(
            "/presence/connections/:id",
            delete(handlers::unregister_connection),
        )
}
