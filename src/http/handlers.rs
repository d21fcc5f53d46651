use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::engagement::{CommentView, EngagementService};
use crate::app::feed::{
    FeedQuery, FeedService, FeedSort, DEFAULT_FEED_LIMIT, DEFAULT_TRENDING_POST_LIMIT,
    DEFAULT_TRENDING_TAG_LIMIT,
};
use crate::app::posts::{AuthorAction, NewPost, PostService, PostUpdate};
use crate::app::reposts::RepostService;
use crate::app::social::{SocialService, SocialUserEdge};
use crate::app::users::{NewUser, UserService};
use crate::domain::post::{FeedPost, PostVisibility};
use crate::domain::user::User;
use crate::http::auth::viewer_from;
use crate::http::{AppError, AuthUser};
use crate::store::Page;
use crate::AppState;

const MAX_PAGE_LIMIT: i64 = 100;
const MAX_COMMENT_LEN: usize = 5000;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

/// Pagination and filter values are tolerant: anything unparsable falls
/// back to its default instead of rejecting the request.
#[derive(Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn coerce_limit(raw: Option<&str>, default: i64, max: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|limit| limit.clamp(1, max))
        .unwrap_or(default)
}

fn coerce_offset(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|offset| offset.max(0))
        .unwrap_or(0)
}

fn page_from(params: &PageParams, default_limit: i64) -> Page {
    Page::new(
        coerce_limit(params.limit.as_deref(), default_limit, MAX_PAGE_LIMIT),
        coerce_offset(params.offset.as_deref()),
    )
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.store.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct FeedParams {
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub tag: Option<String>,
}

pub async fn feed(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let sort = FeedSort::from_param(params.sort.as_deref());
    let query = FeedQuery::new(
        coerce_limit(params.limit.as_deref(), DEFAULT_FEED_LIMIT, MAX_PAGE_LIMIT),
        coerce_offset(params.offset.as_deref()),
        params.tag,
    );

    let service = FeedService::new(state.store.clone());
    let posts = service.page(viewer, sort, &query).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to assemble feed");
        AppError::internal("failed to assemble feed")
    })?;
    Ok(Json(posts))
}

#[derive(Deserialize)]
pub struct TrendingParams {
    pub limit: Option<String>,
}

pub async fn trending_tags(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<String>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let limit = coerce_limit(params.limit.as_deref(), DEFAULT_TRENDING_TAG_LIMIT, 50);

    let service = FeedService::new(state.store.clone());
    let tags = service.trending_tags(viewer, limit).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to compute trending tags");
        AppError::internal("failed to compute trending tags")
    })?;
    Ok(Json(tags))
}

pub async fn trending_posts(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let limit = coerce_limit(params.limit.as_deref(), DEFAULT_TRENDING_POST_LIMIT, 20);

    let service = FeedService::new(state.store.clone());
    let posts = service.trending_posts(viewer, limit).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to compute trending posts");
        AppError::internal("failed to compute trending posts")
    })?;
    Ok(Json(posts))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub rendered_html: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<String>,
    pub publish: Option<bool>,
}

fn parse_visibility(value: &str) -> Result<PostVisibility, AppError> {
    PostVisibility::from_db(value)
        .ok_or_else(|| AppError::bad_request("visibility must be public or followers_only"))
}

pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<FeedPost>), AppError> {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(AppError::bad_request("title and content are required"));
    }
    let visibility = match payload.visibility.as_deref() {
        Some(value) => parse_visibility(value)?,
        None => PostVisibility::Public,
    };

    let service = PostService::new(state.store.clone());
    let post = service
        .create(
            auth.user_id,
            NewPost {
                title: payload.title,
                content: payload.content,
                rendered_html: payload.rendered_html,
                tags: payload.tags.unwrap_or_default(),
                visibility,
                publish: payload.publish.unwrap_or(false),
            },
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, author_id = %auth.user_id, "failed to create post");
            AppError::internal("failed to create post")
        })?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(Deserialize)]
pub struct ListPostsParams {
    pub author: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn list_posts(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<ListPostsParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let page = Page::new(
        coerce_limit(params.limit.as_deref(), DEFAULT_FEED_LIMIT, MAX_PAGE_LIMIT),
        coerce_offset(params.offset.as_deref()),
    );

    let service = PostService::new(state.store.clone());
    let posts = match params.author.as_deref() {
        Some(handle) => {
            let users = UserService::new(state.store.clone());
            let author = users
                .get_by_handle(handle)
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, "failed to resolve author");
                    AppError::internal("failed to list posts")
                })?
                .ok_or_else(|| AppError::not_found("user not found"))?;
            service.list_by_author(author.id, viewer, page).await
        }
        None => service.list(viewer, page).await,
    }
    .map_err(|err| {
        tracing::error!(error = ?err, "failed to list posts");
        AppError::internal("failed to list posts")
    })?;
    Ok(Json(posts))
}

pub async fn list_archived_posts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let service = PostService::new(state.store.clone());
    let posts = service
        .list_archived(auth.user_id, page_from(&params, 50))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list archived posts");
            AppError::internal("failed to list archived posts")
        })?;
    Ok(Json(posts))
}

pub async fn get_post(
    Path(id): Path<Uuid>,
    auth: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<FeedPost>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let service = PostService::new(state.store.clone());
    let post = service.get_public(id, viewer).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;

    // Hidden and absent are indistinguishable on purpose.
    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub rendered_html: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<String>,
    pub publish: Option<bool>,
}

pub async fn update_post(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<FeedPost>, AppError> {
    if let Some(title) = &payload.title {
        if title.trim().is_empty() {
            return Err(AppError::bad_request("title must not be empty"));
        }
    }
    let visibility = match payload.visibility.as_deref() {
        Some(value) => Some(parse_visibility(value)?),
        None => None,
    };

    let service = PostService::new(state.store.clone());
    let outcome = service
        .update(
            id,
            auth.user_id,
            PostUpdate {
                title: payload.title,
                content: payload.content,
                rendered_html: payload.rendered_html,
                tags: payload.tags,
                visibility,
                publish: payload.publish,
            },
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to update post");
            AppError::internal("failed to update post")
        })?;

    match outcome {
        AuthorAction::Done(post) => Ok(Json(post)),
        AuthorAction::NotFound => Err(AppError::not_found("post not found")),
        AuthorAction::NotAuthor => Err(AppError::forbidden("not your post")),
    }
}

pub async fn delete_post(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = PostService::new(state.store.clone());
    let outcome = service.delete(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to delete post");
        AppError::internal("failed to delete post")
    })?;

    match outcome {
        AuthorAction::Done(()) => Ok(StatusCode::NO_CONTENT),
        AuthorAction::NotFound => Err(AppError::not_found("post not found")),
        AuthorAction::NotAuthor => Err(AppError::forbidden("not your post")),
    }
}

#[derive(Serialize)]
pub struct ArchiveResponse {
    pub archived: bool,
}

pub async fn archive_post(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let service = PostService::new(state.store.clone());
    let outcome = service.archive(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to archive post");
        AppError::internal("failed to archive post")
    })?;

    match outcome {
        AuthorAction::Done(()) => Ok(Json(ArchiveResponse { archived: true })),
        AuthorAction::NotFound => Err(AppError::not_found("post not found")),
        AuthorAction::NotAuthor => Err(AppError::forbidden("not your post")),
    }
}

pub async fn unarchive_post(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let service = PostService::new(state.store.clone());
    let outcome = service.unarchive(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to unarchive post");
        AppError::internal("failed to unarchive post")
    })?;

    match outcome {
        AuthorAction::Done(()) => Ok(Json(ArchiveResponse { archived: false })),
        AuthorAction::NotFound => Err(AppError::not_found("post not found")),
        AuthorAction::NotAuthor => Err(AppError::forbidden("not your post")),
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub count: i64,
}

pub async fn toggle_like(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>, AppError> {
    let service = EngagementService::new(state.store.clone());
    let toggle = service
        .toggle_like(auth.user_id, id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to toggle like");
            AppError::internal("failed to toggle like")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;
    Ok(Json(LikeResponse {
        liked: toggle.liked,
        count: toggle.count,
    }))
}

#[derive(Serialize)]
pub struct BookmarkResponse {
    pub bookmarked: bool,
}

pub async fn toggle_bookmark(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BookmarkResponse>, AppError> {
    let service = EngagementService::new(state.store.clone());
    let toggle = service
        .toggle_bookmark(auth.user_id, id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to toggle bookmark");
            AppError::internal("failed to toggle bookmark")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;
    Ok(Json(BookmarkResponse {
        bookmarked: toggle.bookmarked,
    }))
}

#[derive(Serialize)]
pub struct RepostResponse {
    pub reposted: bool,
    pub count: i64,
}

pub async fn toggle_repost(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RepostResponse>, AppError> {
    let service = RepostService::new(state.store.clone());
    let toggle = service
        .toggle(auth.user_id, id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to toggle repost");
            AppError::internal("failed to toggle repost")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;
    Ok(Json(RepostResponse {
        reposted: toggle.reposted,
        count: toggle.count,
    }))
}

pub async fn list_bookmarks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let service = EngagementService::new(state.store.clone());
    let posts = service
        .bookmarks(auth.user_id, page_from(&params, 50))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list bookmarks");
            AppError::internal("failed to list bookmarks")
        })?;
    Ok(Json(posts))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

pub async fn create_comment(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let body = payload.body.trim().to_string();
    if body.is_empty() {
        return Err(AppError::bad_request("comment body is required"));
    }
    if body.len() > MAX_COMMENT_LEN {
        return Err(AppError::bad_request("comment body is too long"));
    }

    let service = EngagementService::new(state.store.clone());
    let comment = service
        .add_comment(id, auth.user_id, body)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to create comment");
            AppError::internal("failed to create comment")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    Path(id): Path<Uuid>,
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<CommentView>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let service = EngagementService::new(state.store.clone());
    let comments = service
        .comments(id, viewer, page_from(&params, 50))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to list comments");
            AppError::internal("failed to list comments")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;
    Ok(Json(comments))
}

pub async fn delete_comment(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = EngagementService::new(state.store.clone());
    let outcome = service
        .delete_comment(id, auth.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = %id, "failed to delete comment");
            AppError::internal("failed to delete comment")
        })?;

    match outcome {
        AuthorAction::Done(()) => Ok(StatusCode::NO_CONTENT),
        AuthorAction::NotFound => Err(AppError::not_found("comment not found")),
        AuthorAction::NotAuthor => Err(AppError::forbidden("not your comment")),
    }
}

// ---------------------------------------------------------------------------
// Users & social graph
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub handle: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let handle = payload.handle.trim().to_string();
    if handle.len() < 3 || handle.len() > 30 {
        return Err(AppError::bad_request(
            "handle must be between 3 and 30 characters",
        ));
    }
    if payload.display_name.trim().is_empty() {
        return Err(AppError::bad_request("display_name is required"));
    }

    let service = UserService::new(state.store.clone());
    let user = service
        .create(NewUser {
            handle,
            display_name: payload.display_name,
            bio: payload.bio,
            avatar_url: payload.avatar_url,
        })
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to create user");
            AppError::internal("failed to create user")
        })?
        .ok_or_else(|| AppError::conflict("handle already taken"))?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let service = UserService::new(state.store.clone());
    let user = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to fetch user");
        AppError::internal("failed to fetch user")
    })?;

    match user {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::not_found("user not found")),
    }
}

pub async fn list_user_posts(
    Path(id): Path<Uuid>,
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let users = UserService::new(state.store.clone());
    if users
        .get(id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %id, "failed to fetch user");
            AppError::internal("failed to list user posts")
        })?
        .is_none()
    {
        return Err(AppError::not_found("user not found"));
    }

    let service = PostService::new(state.store.clone());
    let posts = service
        .list_by_author(id, viewer, page_from(&params, DEFAULT_FEED_LIMIT))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %id, "failed to list user posts");
            AppError::internal("failed to list user posts")
        })?;
    Ok(Json(posts))
}

pub async fn list_user_reposts(
    Path(id): Path<Uuid>,
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<FeedPost>>, AppError> {
    let viewer = viewer_from(auth.as_ref());
    let users = UserService::new(state.store.clone());
    if users
        .get(id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %id, "failed to fetch user");
            AppError::internal("failed to list user reposts")
        })?
        .is_none()
    {
        return Err(AppError::not_found("user not found"));
    }

    let service = RepostService::new(state.store.clone());
    let posts = service
        .list_by_user(id, viewer, page_from(&params, 50))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %id, "failed to list user reposts");
            AppError::internal("failed to list user reposts")
        })?;
    Ok(Json(posts))
}

#[derive(Serialize)]
pub struct FollowResponse {
    pub followed: bool,
}

pub async fn follow_user(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<FollowResponse>, AppError> {
    if auth.user_id == id {
        return Err(AppError::bad_request("cannot follow yourself"));
    }

    let service = SocialService::new(state.store.clone());
    let followed = service
        .follow(auth.user_id, id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, follower_id = %auth.user_id, following_id = %id, "failed to follow user");
            AppError::internal("failed to follow user")
        })?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(FollowResponse { followed }))
}

#[derive(Serialize)]
pub struct UnfollowResponse {
    pub unfollowed: bool,
}

pub async fn unfollow_user(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UnfollowResponse>, AppError> {
    if auth.user_id == id {
        return Err(AppError::bad_request("cannot unfollow yourself"));
    }

    let service = SocialService::new(state.store.clone());
    let unfollowed = service
        .unfollow(auth.user_id, id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, follower_id = %auth.user_id, following_id = %id, "failed to unfollow user");
            AppError::internal("failed to unfollow user")
        })?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(UnfollowResponse { unfollowed }))
}

pub async fn list_followers(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<SocialUserEdge>>, AppError> {
    let service = SocialService::new(state.store.clone());
    let edges = service
        .followers(id, page_from(&params, 50))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %id, "failed to list followers");
            AppError::internal("failed to list followers")
        })?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(edges))
}

pub async fn list_following(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<SocialUserEdge>>, AppError> {
    let service = SocialService::new(state.store.clone());
    let edges = service
        .following(id, page_from(&params, 50))
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %id, "failed to list following");
            AppError::internal("failed to list following")
        })?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(edges))
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct OnlineResponse {
    pub online: usize,
}

pub async fn online_count(State(state): State<AppState>) -> Json<OnlineResponse> {
    Json(OnlineResponse {
        online: state.presence.online_count(),
    })
}

#[derive(Serialize)]
pub struct ConnectionResponse {
    pub connection_id: Uuid,
}

pub async fn register_connection(
    auth: AuthUser,
    State(state): State<AppState>,
) -> (StatusCode, Json<ConnectionResponse>) {
    let connection_id = state.presence.register(auth.user_id);
    (
        StatusCode::CREATED,
        Json(ConnectionResponse { connection_id }),
    )
}

pub async fn unregister_connection(
    Path(id): Path<Uuid>,
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state.presence.unregister(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("connection not found"))
    }
}
