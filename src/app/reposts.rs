use std::sync::Arc;

use anyhow::Result;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::enrich::Enricher;
use crate::app::visibility::viewer_can_see;
use crate::domain::engagement::Repost;
use crate::domain::post::FeedPost;
use crate::domain::timeline::TimelineEvent;
use crate::domain::user::Viewer;
use crate::store::{Page, RepostFilter, Store};

#[derive(Debug, Clone, Copy)]
pub struct RepostToggle {
    pub reposted: bool,
    pub count: i64,
}

#[derive(Clone)]
pub struct RepostService {
    store: Arc<dyn Store>,
    enricher: Enricher,
}

impl RepostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let enricher = Enricher::new(store.clone());
        Self { store, enricher }
    }

    /// Repost on first call, un-repost on the next. `None` when the post
    /// does not exist or is hidden from this user.
    pub async fn toggle(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<RepostToggle>> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(None);
        };
        if !viewer_can_see(self.store.as_ref(), &post, Viewer::user(user_id)).await? {
            return Ok(None);
        }

        let reposted = match self.store.find_repost(user_id, post_id).await? {
            Some(existing) => {
                self.store.delete_repost(existing.id).await?;
                false
            }
            None => {
                let repost = Repost {
                    id: Uuid::new_v4(),
                    user_id,
                    post_id,
                    created_at: OffsetDateTime::now_utc(),
                };
                self.store.insert_repost(&repost).await?;
                true
            }
        };
        let count = self.store.repost_count(post_id).await?;
        Ok(Some(RepostToggle { reposted, count }))
    }

    /// A user's reposts as feed entries with repost framing, newest first.
    /// Targets hidden from the viewer are gated out by the store filter.
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        viewer: Viewer,
        page: Page,
    ) -> Result<Vec<FeedPost>> {
        let filter = RepostFilter {
            viewer,
            reposters: Some(vec![user_id]),
            tag: None,
        };
        let reposts = self.store.find_reposts(&filter, page).await?;
        let events: Vec<TimelineEvent> = reposts
            .iter()
            .map(|repost| {
                TimelineEvent::reposted(repost.post_id, repost.id, repost.user_id, repost.created_at)
            })
            .collect();
        self.enricher.hydrate_events(&events, viewer).await
    }
}
