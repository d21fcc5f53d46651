pub mod memory;
pub mod postgres;

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::engagement::{Bookmark, Comment, Like, Repost};
use crate::domain::post::Post;
use crate::domain::social_graph::Follow;
use crate::domain::user::{User, Viewer};

/// Offset pagination window. Feed substreams are fetched as
/// `{ limit: offset + limit, offset: 0 }` so the page boundary can be
/// computed after the merge.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }
}

/// Composed filter for the original-post event stream. Both stores resolve
/// it against the same visibility rules (`app::visibility::feed_eligible`);
/// results are ordered `published_at DESC, id DESC`.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub viewer: Viewer,
    /// Restrict to these authors (friends mode, author pages). `None` means
    /// the global stream.
    pub authors: Option<Vec<Uuid>>,
    /// Exact, lowercase tag membership.
    pub tag: Option<String>,
}

impl PostFilter {
    pub fn global(viewer: Viewer) -> Self {
        Self {
            viewer,
            authors: None,
            tag: None,
        }
    }
}

/// Composed filter for the repost event stream. Visibility gates on the
/// *target post*, never on the reposter; results are ordered
/// `created_at DESC, id DESC`.
#[derive(Debug, Clone)]
pub struct RepostFilter {
    pub viewer: Viewer,
    pub reposters: Option<Vec<Uuid>>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementCounts {
    pub likes: i64,
    pub comments: i64,
    pub reposts: i64,
}

/// Which of the given posts the viewer has liked/bookmarked/reposted.
#[derive(Debug, Clone, Default)]
pub struct ViewerMarks {
    pub liked: HashSet<Uuid>,
    pub bookmarked: HashSet<Uuid>,
    pub reposted: HashSet<Uuid>,
}

/// Persistence seam. The feed core is written against this trait so the
/// merge/rank/visibility logic is independent of what stores the rows;
/// `postgres::PgStore` backs production and `memory::MemoryStore` backs the
/// test harness.
#[async_trait]
pub trait Store: Send + Sync {
    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<()>;

    // users
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_handle(&self, handle: &str) -> Result<Option<User>>;
    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    // posts
    async fn insert_post(&self, post: &Post) -> Result<()>;
    async fn update_post(&self, post: &Post) -> Result<bool>;
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>>;
    async fn find_posts(&self, filter: &PostFilter, page: Page) -> Result<Vec<Post>>;
    async fn archived_posts(&self, author_id: Uuid, page: Page) -> Result<Vec<Post>>;
    async fn bump_view_count(&self, id: Uuid) -> Result<()>;

    // reposts
    async fn find_reposts(&self, filter: &RepostFilter, page: Page) -> Result<Vec<Repost>>;
    async fn find_repost(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Repost>>;
    async fn insert_repost(&self, repost: &Repost) -> Result<()>;
    async fn delete_repost(&self, id: Uuid) -> Result<bool>;
    async fn repost_count(&self, post_id: Uuid) -> Result<i64>;

    // follows
    async fn insert_follow(&self, follow: &Follow) -> Result<bool>;
    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool>;
    async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool>;
    async fn following_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>>;
    async fn followers_of(&self, user_id: Uuid, page: Page) -> Result<Vec<Follow>>;
    async fn following_of(&self, user_id: Uuid, page: Page) -> Result<Vec<Follow>>;

    // likes
    async fn find_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Like>>;
    async fn insert_like(&self, like: &Like) -> Result<()>;
    async fn delete_like(&self, id: Uuid) -> Result<bool>;
    async fn like_count(&self, post_id: Uuid) -> Result<i64>;

    // bookmarks
    async fn find_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Bookmark>>;
    async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<()>;
    async fn delete_bookmark(&self, id: Uuid) -> Result<bool>;
    async fn bookmarks_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Bookmark>>;

    // comments
    async fn insert_comment(&self, comment: &Comment) -> Result<()>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn comments_by_post(&self, post_id: Uuid, page: Page) -> Result<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool>;

    // enrichment batches
    async fn engagement_counts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EngagementCounts>>;
    async fn viewer_marks(&self, viewer_id: Uuid, post_ids: &[Uuid]) -> Result<ViewerMarks>;
}
