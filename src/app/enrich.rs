use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::domain::post::{FeedPost, Post, RepostContext};
use crate::domain::timeline::TimelineEvent;
use crate::domain::user::{User, Viewer};
use crate::store::{EngagementCounts, Store, ViewerMarks};

/// Hydrates bare post ids into full feed payloads: author summaries,
/// engagement counts, viewer-relative flags, and repost provenance.
/// Visibility is settled before this stage; nothing here re-checks it.
#[derive(Clone)]
pub struct Enricher {
    store: Arc<dyn Store>,
}

impl Enricher {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Hydrate a merged, paginated slice of timeline events, preserving
    /// order. One underlying post may appear several times (original plus
    /// reposts); it is fetched once and emitted per event.
    pub async fn hydrate_events(
        &self,
        events: &[TimelineEvent],
        viewer: Viewer,
    ) -> Result<Vec<FeedPost>> {
        let post_ids = unique_ids(events.iter().map(|event| event.post_id));
        let posts = index_posts(self.store.posts_by_ids(&post_ids).await?);

        let mut user_ids: Vec<Uuid> = posts.values().map(|post| post.author_id).collect();
        user_ids.extend(
            events
                .iter()
                .filter_map(|event| event.repost.map(|repost| repost.reposter_id)),
        );
        let users = index_users(self.store.users_by_ids(&unique_ids(user_ids)).await?);

        let counts = self.store.engagement_counts(&post_ids).await?;
        let marks = self.marks_for(viewer, &post_ids).await?;

        let mut items = Vec::with_capacity(events.len());
        for event in events {
            // A post or account deleted between the event fetch and here
            // drops the entry rather than failing the page.
            let Some(post) = posts.get(&event.post_id) else {
                continue;
            };
            let Some(author) = users.get(&post.author_id) else {
                continue;
            };
            let repost = match event.repost {
                Some(repost_ref) => {
                    let Some(reposter) = users.get(&repost_ref.reposter_id) else {
                        continue;
                    };
                    Some(RepostContext {
                        repost_id: repost_ref.repost_id,
                        reposted_at: event.event_at,
                        reposter: reposter.into(),
                    })
                }
                None => None,
            };
            items.push(feed_post(post, author, &counts, &marks, repost));
        }
        Ok(items)
    }

    /// Hydrate posts fetched directly (popularity ranking, listings, single
    /// reads), preserving order. No repost framing applies here.
    pub async fn hydrate_posts(&self, posts: Vec<Post>, viewer: Viewer) -> Result<Vec<FeedPost>> {
        let post_ids = unique_ids(posts.iter().map(|post| post.id));
        let author_ids = unique_ids(posts.iter().map(|post| post.author_id));
        let users = index_users(self.store.users_by_ids(&author_ids).await?);

        let counts = self.store.engagement_counts(&post_ids).await?;
        let marks = self.marks_for(viewer, &post_ids).await?;

        let mut items = Vec::with_capacity(posts.len());
        for post in &posts {
            let Some(author) = users.get(&post.author_id) else {
                continue;
            };
            items.push(feed_post(post, author, &counts, &marks, None));
        }
        Ok(items)
    }

    async fn marks_for(&self, viewer: Viewer, post_ids: &[Uuid]) -> Result<ViewerMarks> {
        match viewer.user_id {
            Some(viewer_id) => self.store.viewer_marks(viewer_id, post_ids).await,
            None => Ok(ViewerMarks::default()),
        }
    }
}

fn unique_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn index_posts(posts: Vec<Post>) -> HashMap<Uuid, Post> {
    posts.into_iter().map(|post| (post.id, post)).collect()
}

fn index_users(users: Vec<User>) -> HashMap<Uuid, User> {
    users.into_iter().map(|user| (user.id, user)).collect()
}

fn feed_post(
    post: &Post,
    author: &User,
    counts: &HashMap<Uuid, EngagementCounts>,
    marks: &ViewerMarks,
    repost: Option<RepostContext>,
) -> FeedPost {
    let engagement = counts.get(&post.id).copied().unwrap_or_default();
    FeedPost {
        id: post.id,
        author: author.into(),
        title: post.title.clone(),
        content: post.content.clone(),
        rendered_html: post.rendered_html.clone(),
        tags: post.tags.clone(),
        visibility: post.visibility,
        published_at: post.published_at,
        view_count: post.view_count,
        created_at: post.created_at,
        like_count: engagement.likes,
        comment_count: engagement.comments,
        repost_count: engagement.reposts,
        is_liked: marks.liked.contains(&post.id),
        is_bookmarked: marks.bookmarked.contains(&post.id),
        is_reposted: marks.reposted.contains(&post.id),
        repost,
    }
}
