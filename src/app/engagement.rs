use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::enrich::Enricher;
use crate::app::posts::AuthorAction;
use crate::app::visibility::{is_visible, viewer_can_see};
use crate::domain::engagement::{Bookmark, Comment, Like};
use crate::domain::post::FeedPost;
use crate::domain::user::{UserSummary, Viewer};
use crate::store::{Page, Store};

#[derive(Debug, Clone, Copy)]
pub struct LikeToggle {
    pub liked: bool,
    pub count: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct BookmarkToggle {
    pub bookmarked: bool,
}

/// Comment hydrated with its author summary.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: UserSummary,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn Store>,
    enricher: Enricher,
}

impl EngagementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let enricher = Enricher::new(store.clone());
        Self { store, enricher }
    }

    pub async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<LikeToggle>> {
        if !self.can_interact(user_id, post_id).await? {
            return Ok(None);
        }
        let liked = match self.store.find_like(user_id, post_id).await? {
            Some(existing) => {
                self.store.delete_like(existing.id).await?;
                false
            }
            None => {
                let like = Like {
                    id: Uuid::new_v4(),
                    user_id,
                    post_id,
                    created_at: OffsetDateTime::now_utc(),
                };
                self.store.insert_like(&like).await?;
                true
            }
        };
        let count = self.store.like_count(post_id).await?;
        Ok(Some(LikeToggle { liked, count }))
    }

    pub async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<BookmarkToggle>> {
        if !self.can_interact(user_id, post_id).await? {
            return Ok(None);
        }
        let bookmarked = match self.store.find_bookmark(user_id, post_id).await? {
            Some(existing) => {
                self.store.delete_bookmark(existing.id).await?;
                false
            }
            None => {
                let bookmark = Bookmark {
                    id: Uuid::new_v4(),
                    user_id,
                    post_id,
                    created_at: OffsetDateTime::now_utc(),
                };
                self.store.insert_bookmark(&bookmark).await?;
                true
            }
        };
        Ok(Some(BookmarkToggle { bookmarked }))
    }

    /// The user's bookmarked posts, most recently saved first. Posts that
    /// have since become invisible to the user are dropped from the page.
    pub async fn bookmarks(&self, user_id: Uuid, page: Page) -> Result<Vec<FeedPost>> {
        let viewer = Viewer::user(user_id);
        let bookmarks = self.store.bookmarks_by_user(user_id, page).await?;
        let post_ids: Vec<Uuid> = bookmarks.iter().map(|bookmark| bookmark.post_id).collect();
        let posts = self.store.posts_by_ids(&post_ids).await?;

        let following: HashSet<Uuid> = self
            .store
            .following_ids(user_id)
            .await?
            .into_iter()
            .collect();
        let by_id: std::collections::HashMap<Uuid, _> =
            posts.into_iter().map(|post| (post.id, post)).collect();
        let visible: Vec<_> = post_ids
            .iter()
            .filter_map(|id| by_id.get(id))
            .filter(|post| is_visible(post, viewer, following.contains(&post.author_id)))
            .cloned()
            .collect();
        self.enricher.hydrate_posts(visible, viewer).await
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> Result<Option<CommentView>> {
        if !self.can_interact(author_id, post_id).await? {
            return Ok(None);
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            body,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.insert_comment(&comment).await?;
        let author = self
            .store
            .find_user(author_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("comment author missing"))?;
        Ok(Some(comment_view(comment, &author)))
    }

    /// Comments on a post the viewer can see, oldest first. `None` when the
    /// post itself is absent or hidden.
    pub async fn comments(
        &self,
        post_id: Uuid,
        viewer: Viewer,
        page: Page,
    ) -> Result<Option<Vec<CommentView>>> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(None);
        };
        if !viewer_can_see(self.store.as_ref(), &post, viewer).await? {
            return Ok(None);
        }

        let comments = self.store.comments_by_post(post_id, page).await?;
        let author_ids: Vec<Uuid> = comments.iter().map(|comment| comment.author_id).collect();
        let authors: std::collections::HashMap<Uuid, _> = self
            .store
            .users_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let views = comments
            .into_iter()
            .filter_map(|comment| {
                authors
                    .get(&comment.author_id)
                    .map(|author| comment_view(comment, author))
            })
            .collect();
        Ok(Some(views))
    }

    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<AuthorAction<()>> {
        let Some(comment) = self.store.find_comment(comment_id).await? else {
            return Ok(AuthorAction::NotFound);
        };
        if comment.author_id != user_id {
            return Ok(AuthorAction::NotAuthor);
        }
        self.store.delete_comment(comment_id).await?;
        Ok(AuthorAction::Done(()))
    }

    /// Interactions target a post the user can see; a hidden target reads
    /// as absent, same as the single-item lookup.
    async fn can_interact(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(false);
        };
        viewer_can_see(self.store.as_ref(), &post, Viewer::user(user_id)).await
    }
}

fn comment_view(comment: Comment, author: &crate::domain::user::User) -> CommentView {
    CommentView {
        id: comment.id,
        post_id: comment.post_id,
        author: author.into(),
        body: comment.body,
        created_at: comment.created_at,
    }
}
