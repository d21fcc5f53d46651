use time::OffsetDateTime;
use uuid::Uuid;

/// One feed appearance of a post: its original publication, or one repost
/// of it. Derived from current post/repost state on every read, never
/// persisted. A post with n reposts yields up to n + 1 events.
#[derive(Debug, Clone, Copy)]
pub struct TimelineEvent {
    pub post_id: Uuid,
    pub event_at: OffsetDateTime,
    pub repost: Option<RepostRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct RepostRef {
    pub repost_id: Uuid,
    pub reposter_id: Uuid,
}

impl TimelineEvent {
    pub fn original(post_id: Uuid, published_at: OffsetDateTime) -> Self {
        Self {
            post_id,
            event_at: published_at,
            repost: None,
        }
    }

    pub fn reposted(
        post_id: Uuid,
        repost_id: Uuid,
        reposter_id: Uuid,
        reposted_at: OffsetDateTime,
    ) -> Self {
        Self {
            post_id,
            event_at: reposted_at,
            repost: Some(RepostRef {
                repost_id,
                reposter_id,
            }),
        }
    }

    /// Secondary sort key: the id of the row that produced the event. Two
    /// events never share one, so ordering at equal timestamps is stable
    /// across calls and page boundaries.
    pub fn sort_id(&self) -> Uuid {
        match self.repost {
            Some(repost) => repost.repost_id,
            None => self.post_id,
        }
    }
}
