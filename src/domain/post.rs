use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    /// HTML produced by the upstream renderer; served as-is on reads.
    pub rendered_html: String,
    /// Lowercase, trimmed, deduplicated.
    pub tags: Vec<String>,
    pub visibility: PostVisibility,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub archived_at: Option<OffsetDateTime>,
    pub view_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostVisibility {
    Public,
    FollowersOnly,
}

impl PostVisibility {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "followers_only" => Some(Self::FollowersOnly),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::FollowersOnly => "followers_only",
        }
    }
}

/// Fully hydrated post payload: base post fields, author summary, engagement
/// counts, viewer-relative flags, and repost provenance when the feed entry
/// came from a repost event.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author: UserSummary,
    pub title: String,
    pub content: String,
    pub rendered_html: String,
    pub tags: Vec<String>,
    pub visibility: PostVisibility,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub view_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub like_count: i64,
    pub comment_count: i64,
    pub repost_count: i64,
    pub is_liked: bool,
    pub is_bookmarked: bool,
    pub is_reposted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repost: Option<RepostContext>,
}

/// "X reposted" framing: present iff the entry was produced by a repost
/// event rather than the post's own publication.
#[derive(Debug, Clone, Serialize)]
pub struct RepostContext {
    pub repost_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub reposted_at: OffsetDateTime,
    pub reposter: UserSummary,
}
