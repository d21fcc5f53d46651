use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::social_graph::Follow;
use crate::domain::user::UserSummary;
use crate::store::{Page, Store};

/// One edge of a follower/following listing.
#[derive(Debug, Clone, Serialize)]
pub struct SocialUserEdge {
    pub user: UserSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub followed_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `None` when the target user does not exist; otherwise whether a new
    /// edge was created (re-following is idempotent).
    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Option<bool>> {
        if self.store.find_user(following_id).await?.is_none() {
            return Ok(None);
        }
        let follow = Follow {
            follower_id,
            following_id,
            created_at: OffsetDateTime::now_utc(),
        };
        let created = self.store.insert_follow(&follow).await?;
        Ok(Some(created))
    }

    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Option<bool>> {
        if self.store.find_user(following_id).await?.is_none() {
            return Ok(None);
        }
        let removed = self.store.delete_follow(follower_id, following_id).await?;
        Ok(Some(removed))
    }

    pub async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        self.store.is_following(follower_id, following_id).await
    }

    pub async fn followers(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Option<Vec<SocialUserEdge>>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Ok(None);
        }
        let follows = self.store.followers_of(user_id, page).await?;
        let edges = self
            .hydrate_edges(&follows, |follow| follow.follower_id)
            .await?;
        Ok(Some(edges))
    }

    pub async fn following(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Option<Vec<SocialUserEdge>>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Ok(None);
        }
        let follows = self.store.following_of(user_id, page).await?;
        let edges = self
            .hydrate_edges(&follows, |follow| follow.following_id)
            .await?;
        Ok(Some(edges))
    }

    async fn hydrate_edges(
        &self,
        follows: &[Follow],
        side: impl Fn(&Follow) -> Uuid,
    ) -> Result<Vec<SocialUserEdge>> {
        let ids: Vec<Uuid> = follows.iter().map(&side).collect();
        let users: HashMap<Uuid, _> = self
            .store
            .users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();
        Ok(follows
            .iter()
            .filter_map(|follow| {
                users.get(&side(follow)).map(|user| SocialUserEdge {
                    user: user.into(),
                    followed_at: follow.created_at,
                })
            })
            .collect())
    }
}
