use anyhow::Result;

use crate::domain::post::{Post, PostVisibility};
use crate::domain::user::Viewer;
use crate::store::Store;

/// Whether `viewer` may see `post` at all. Pure and total; every read path
/// goes through this predicate (the SQL store pushes down an equivalent
/// composed filter, the in-memory store calls it directly).
///
/// Rules, in order:
/// 1. privileged viewers see everything
/// 2. unpublished posts are hidden; archived posts are hidden from everyone
///    but the author
/// 3. public posts are visible
/// 4. followers-only posts are visible to the author and their followers
/// 5. anonymous viewers never see followers-only posts
pub fn is_visible(post: &Post, viewer: Viewer, follows_author: bool) -> bool {
    if viewer.privileged {
        return true;
    }
    if !post.is_published {
        return false;
    }
    if post.archived_at.is_some() && viewer.user_id != Some(post.author_id) {
        return false;
    }
    match post.visibility {
        PostVisibility::Public => true,
        PostVisibility::FollowersOnly => match viewer.user_id {
            Some(user_id) => user_id == post.author_id || follows_author,
            None => false,
        },
    }
}

/// [`is_visible`] with the follow edge resolved through the store. The
/// lookup is skipped when it cannot change the answer.
pub async fn viewer_can_see(store: &dyn Store, post: &Post, viewer: Viewer) -> Result<bool> {
    let follows_author = match (post.visibility, viewer.user_id) {
        (PostVisibility::FollowersOnly, Some(viewer_id)) if viewer_id != post.author_id => {
            store.is_following(viewer_id, post.author_id).await?
        }
        _ => false,
    };
    Ok(is_visible(post, viewer, follows_author))
}

/// Whether `post` may produce timeline events for `viewer`. Stricter than
/// [`is_visible`]: feeds and listings never surface archived posts (the
/// author reaches those through the archived listing), and a post without a
/// publication timestamp has no event to emit. Privileged viewers keep the
/// archival bypass.
pub fn feed_eligible(post: &Post, viewer: Viewer, follows_author: bool) -> bool {
    if !post.is_published || post.published_at.is_none() {
        return false;
    }
    if viewer.privileged {
        return true;
    }
    if post.archived_at.is_some() {
        return false;
    }
    is_visible(post, viewer, follows_author)
}
