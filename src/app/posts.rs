use std::sync::Arc;

use anyhow::Result;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::enrich::Enricher;
use crate::app::visibility::viewer_can_see;
use crate::domain::post::{FeedPost, Post, PostVisibility};
use crate::domain::user::Viewer;
use crate::store::{Page, PostFilter, Store};

/// Outcome of a write that only the resource's author may perform.
#[derive(Debug)]
pub enum AuthorAction<T> {
    Done(T),
    NotFound,
    NotAuthor,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    /// HTML from the upstream renderer; falls back to the raw content.
    pub rendered_html: Option<String>,
    pub tags: Vec<String>,
    pub visibility: PostVisibility,
    pub publish: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub rendered_html: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<PostVisibility>,
    pub publish: Option<bool>,
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
    enricher: Enricher,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let enricher = Enricher::new(store.clone());
        Self { store, enricher }
    }

    pub async fn create(&self, author_id: Uuid, new: NewPost) -> Result<FeedPost> {
        let now = OffsetDateTime::now_utc();
        let rendered_html = new.rendered_html.unwrap_or_else(|| new.content.clone());
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            title: new.title,
            content: new.content,
            rendered_html,
            tags: normalize_tags(new.tags),
            visibility: new.visibility,
            is_published: new.publish,
            published_at: new.publish.then_some(now),
            archived_at: None,
            view_count: 0,
            created_at: now,
        };
        self.store.insert_post(&post).await?;
        self.hydrate_one(post, Viewer::user(author_id)).await
    }

    /// Single-item read under the visibility policy. A hidden post and an
    /// absent one are both `None` so existence never leaks. Successful
    /// reads record a view asynchronously; the count is best-effort.
    pub async fn get_public(&self, post_id: Uuid, viewer: Viewer) -> Result<Option<FeedPost>> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(None);
        };
        if !viewer_can_see(self.store.as_ref(), &post, viewer).await? {
            return Ok(None);
        }

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.bump_view_count(post_id).await {
                tracing::warn!(error = ?err, post_id = %post_id, "failed to record post view");
            }
        });

        self.hydrate_one(post, viewer).await.map(Some)
    }

    pub async fn update(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        update: PostUpdate,
    ) -> Result<AuthorAction<FeedPost>> {
        let Some(mut post) = self.store.find_post(post_id).await? else {
            return Ok(AuthorAction::NotFound);
        };
        if post.author_id != author_id {
            return Ok(AuthorAction::NotAuthor);
        }

        if let Some(title) = update.title {
            post.title = title;
        }
        if let Some(content) = update.content {
            post.rendered_html = update
                .rendered_html
                .clone()
                .unwrap_or_else(|| content.clone());
            post.content = content;
        } else if let Some(rendered_html) = update.rendered_html {
            post.rendered_html = rendered_html;
        }
        if let Some(tags) = update.tags {
            post.tags = normalize_tags(tags);
        }
        if let Some(visibility) = update.visibility {
            post.visibility = visibility;
        }
        if let Some(publish) = update.publish {
            post.is_published = publish;
            // Fixed at the first publish; republishing never moves it.
            if publish && post.published_at.is_none() {
                post.published_at = Some(OffsetDateTime::now_utc());
            }
        }

        self.store.update_post(&post).await?;
        let item = self.hydrate_one(post, Viewer::user(author_id)).await?;
        Ok(AuthorAction::Done(item))
    }

    pub async fn delete(&self, post_id: Uuid, author_id: Uuid) -> Result<AuthorAction<()>> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(AuthorAction::NotFound);
        };
        if post.author_id != author_id {
            return Ok(AuthorAction::NotAuthor);
        }
        self.store.delete_post(post_id).await?;
        Ok(AuthorAction::Done(()))
    }

    /// Archival hides a post from every listing without deleting it, and is
    /// reversible.
    pub async fn archive(&self, post_id: Uuid, author_id: Uuid) -> Result<AuthorAction<()>> {
        self.set_archived(post_id, author_id, Some(OffsetDateTime::now_utc()))
            .await
    }

    pub async fn unarchive(&self, post_id: Uuid, author_id: Uuid) -> Result<AuthorAction<()>> {
        self.set_archived(post_id, author_id, None).await
    }

    async fn set_archived(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        archived_at: Option<OffsetDateTime>,
    ) -> Result<AuthorAction<()>> {
        let Some(mut post) = self.store.find_post(post_id).await? else {
            return Ok(AuthorAction::NotFound);
        };
        if post.author_id != author_id {
            return Ok(AuthorAction::NotAuthor);
        }
        post.archived_at = archived_at;
        self.store.update_post(&post).await?;
        Ok(AuthorAction::Done(()))
    }

    pub async fn list(&self, viewer: Viewer, page: Page) -> Result<Vec<FeedPost>> {
        let posts = self
            .store
            .find_posts(&PostFilter::global(viewer), page)
            .await?;
        self.enricher.hydrate_posts(posts, viewer).await
    }

    pub async fn list_by_author(
        &self,
        author_id: Uuid,
        viewer: Viewer,
        page: Page,
    ) -> Result<Vec<FeedPost>> {
        let filter = PostFilter {
            viewer,
            authors: Some(vec![author_id]),
            tag: None,
        };
        let posts = self.store.find_posts(&filter, page).await?;
        self.enricher.hydrate_posts(posts, viewer).await
    }

    /// The author's own archived posts, newest archival first.
    pub async fn list_archived(&self, author_id: Uuid, page: Page) -> Result<Vec<FeedPost>> {
        let posts = self.store.archived_posts(author_id, page).await?;
        self.enricher
            .hydrate_posts(posts, Viewer::user(author_id))
            .await
    }

    async fn hydrate_one(&self, post: Post, viewer: Viewer) -> Result<FeedPost> {
        self.enricher
            .hydrate_posts(vec![post], viewer)
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("post author missing"))
    }
}

/// Tags are stored lowercase, trimmed, and deduplicated; matching is exact.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}
