use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::app::enrich::Enricher;
use crate::domain::post::{FeedPost, Post};
use crate::domain::timeline::TimelineEvent;
use crate::domain::user::Viewer;
use crate::store::{Page, PostFilter, RepostFilter, Store};

pub const DEFAULT_FEED_LIMIT: i64 = 20;
pub const DEFAULT_TRENDING_TAG_LIMIT: i64 = 10;
pub const DEFAULT_TRENDING_POST_LIMIT: i64 = 5;

/// How many recent posts the trending-posts ranker considers.
const TRENDING_POST_WINDOW: i64 = 50;
/// How many recent posts the trending-tags counter scans.
const TRENDING_TAG_SCAN: i64 = 5000;

#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub limit: i64,
    pub offset: i64,
    pub tag: Option<String>,
}

impl FeedQuery {
    pub fn new(limit: i64, offset: i64, tag: Option<String>) -> Self {
        // Tags are matched exactly against the stored lowercase form.
        let tag = tag
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty());
        Self { limit, offset, tag }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSort {
    Latest,
    Friends,
    Popular,
}

impl FeedSort {
    /// Unknown or missing values fall back to the chronological default.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("friends") => Self::Friends,
            Some("popular") => Self::Popular,
            _ => Self::Latest,
        }
    }
}

/// Assembles feed pages: merges original-post and repost event streams
/// chronologically, or ranks a candidate window by engagement. All modes
/// are read-only and paginate after the merge.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn Store>,
    enricher: Enricher,
}

impl FeedService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let enricher = Enricher::new(store.clone());
        Self { store, enricher }
    }

    /// Single entry point: dispatches on the requested sort. The friends
    /// feed needs an authenticated viewer; anonymous callers get an empty
    /// page, not an error and not the global feed.
    pub async fn page(
        &self,
        viewer: Viewer,
        sort: FeedSort,
        query: &FeedQuery,
    ) -> Result<Vec<FeedPost>> {
        match sort {
            FeedSort::Popular => self.popular(viewer, query).await,
            FeedSort::Friends => match viewer.user_id {
                Some(user_id) => self.friends(viewer, user_id, query).await,
                None => Ok(Vec::new()),
            },
            FeedSort::Latest => self.chronological(viewer, query).await,
        }
    }

    /// Global chronological feed: every visible post and every repost of a
    /// visible post, newest event first.
    pub async fn chronological(&self, viewer: Viewer, query: &FeedQuery) -> Result<Vec<FeedPost>> {
        self.merged(viewer, None, query).await
    }

    /// Friends feed: the viewer's own activity plus followed accounts'.
    /// The author set always contains the viewer, so an empty follow list
    /// yields the viewer's own posts or nothing.
    pub async fn friends(
        &self,
        viewer: Viewer,
        user_id: Uuid,
        query: &FeedQuery,
    ) -> Result<Vec<FeedPost>> {
        let mut authors = self.store.following_ids(user_id).await?;
        authors.push(user_id);
        self.merged(viewer, Some(authors), query).await
    }

    async fn merged(
        &self,
        viewer: Viewer,
        authors: Option<Vec<Uuid>>,
        query: &FeedQuery,
    ) -> Result<Vec<FeedPost>> {
        // The top offset+limit events of the union can only come from the
        // top offset+limit of each substream, so that window is fetched
        // from both and the page is sliced after the merge. Slicing per
        // substream instead would skew page boundaries toward whichever
        // stream is fetched first.
        let window = Page::new(query.offset + query.limit, 0);
        let post_filter = PostFilter {
            viewer,
            authors: authors.clone(),
            tag: query.tag.clone(),
        };
        let repost_filter = RepostFilter {
            viewer,
            reposters: authors,
            tag: query.tag.clone(),
        };

        let posts = self.store.find_posts(&post_filter, window).await?;
        let reposts = self.store.find_reposts(&repost_filter, window).await?;

        let mut events: Vec<TimelineEvent> = posts
            .iter()
            .filter_map(|post| {
                post.published_at
                    .map(|published_at| TimelineEvent::original(post.id, published_at))
            })
            .collect();
        events.extend(
            reposts
                .iter()
                .map(|repost| {
                    TimelineEvent::reposted(
                        repost.post_id,
                        repost.id,
                        repost.user_id,
                        repost.created_at,
                    )
                }),
        );
        events.sort_by(|a, b| {
            b.event_at
                .cmp(&a.event_at)
                .then_with(|| b.sort_id().cmp(&a.sort_id()))
        });

        let page: Vec<TimelineEvent> = events
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        self.enricher.hydrate_events(&page, viewer).await
    }

    /// Engagement-ranked feed over a candidate window of `2 × limit` recent
    /// posts starting at `offset`. The window is a deliberate approximation:
    /// a post outside it never surfaces, however high its score. Scoring is
    /// `2 × likes + comments`; ties keep the window's recency order.
    pub async fn popular(&self, viewer: Viewer, query: &FeedQuery) -> Result<Vec<FeedPost>> {
        self.ranked(
            viewer,
            query.tag.clone(),
            Page::new(query.limit * 2, query.offset),
            query.limit,
        )
        .await
    }

    /// The popularity ranker over a fixed window of recent posts.
    pub async fn trending_posts(&self, viewer: Viewer, limit: i64) -> Result<Vec<FeedPost>> {
        self.ranked(viewer, None, Page::new(TRENDING_POST_WINDOW, 0), limit)
            .await
    }

    /// Tag frequency over a bounded scan of recent visible posts.
    pub async fn trending_tags(&self, viewer: Viewer, limit: i64) -> Result<Vec<String>> {
        let filter = PostFilter::global(viewer);
        let posts = self
            .store
            .find_posts(&filter, Page::new(TRENDING_TAG_SCAN, 0))
            .await?;

        let mut counts: HashMap<String, i64> = HashMap::new();
        for post in posts {
            for tag in post.tags {
                let tag = tag.trim().to_lowercase();
                if !tag.is_empty() {
                    *counts.entry(tag).or_default() += 1;
                }
            }
        }
        let mut tags: Vec<(String, i64)> = counts.into_iter().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(tags
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(tag, _)| tag)
            .collect())
    }

    async fn ranked(
        &self,
        viewer: Viewer,
        tag: Option<String>,
        window: Page,
        limit: i64,
    ) -> Result<Vec<FeedPost>> {
        let filter = PostFilter {
            viewer,
            authors: None,
            tag,
        };
        let candidates = self.store.find_posts(&filter, window).await?;
        let ids: Vec<Uuid> = candidates.iter().map(|post| post.id).collect();
        let counts = self.store.engagement_counts(&ids).await?;

        let mut scored: Vec<(i64, Post)> = candidates
            .into_iter()
            .map(|post| {
                let engagement = counts.get(&post.id).copied().unwrap_or_default();
                (2 * engagement.likes + engagement.comments, post)
            })
            .collect();
        // Stable sort: equal scores keep the fetch (recency) order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let top: Vec<Post> = scored
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, post)| post)
            .collect();
        self.enricher.hydrate_posts(top, viewer).await
    }
}
