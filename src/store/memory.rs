use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::app::visibility::feed_eligible;
use crate::domain::engagement::{Bookmark, Comment, Like, Repost};
use crate::domain::post::Post;
use crate::domain::social_graph::Follow;
use crate::domain::user::User;
use crate::store::{EngagementCounts, Page, PostFilter, RepostFilter, Store, ViewerMarks};

/// Map-backed [`Store`]. Applies the same visibility predicate the SQL
/// store pushes down, which keeps the two implementations interchangeable
/// and lets the test suite run without external services.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    reposts: HashMap<Uuid, Repost>,
    follows: HashMap<(Uuid, Uuid), Follow>,
    likes: HashMap<Uuid, Like>,
    bookmarks: HashMap<Uuid, Bookmark>,
    comments: HashMap<Uuid, Comment>,
}

impl Inner {
    fn follows_author(&self, viewer_id: Option<Uuid>, author_id: Uuid) -> bool {
        match viewer_id {
            Some(viewer_id) => self.follows.contains_key(&(viewer_id, author_id)),
            None => false,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| anyhow!("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))
    }
}

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.write()?.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.handle == handle)
            .cloned())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let inner = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.write()?.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> Result<bool> {
        let mut inner = self.write()?;
        match inner.posts.contains_key(&post.id) {
            true => {
                inner.posts.insert(post.id, post.clone());
                Ok(true)
            }
            false => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.write()?;
        let removed = inner.posts.remove(&id).is_some();
        if removed {
            inner.reposts.retain(|_, repost| repost.post_id != id);
            inner.likes.retain(|_, like| like.post_id != id);
            inner.bookmarks.retain(|_, bookmark| bookmark.post_id != id);
            inner.comments.retain(|_, comment| comment.post_id != id);
        }
        Ok(removed)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>> {
        let inner = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.posts.get(id).cloned())
            .collect())
    }

    async fn find_posts(&self, filter: &PostFilter, page: Page) -> Result<Vec<Post>> {
        let inner = self.read()?;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|post| match &filter.authors {
                Some(authors) => authors.contains(&post.author_id),
                None => true,
            })
            .filter(|post| match &filter.tag {
                Some(tag) => post.tags.iter().any(|t| t == tag),
                None => true,
            })
            .filter(|post| {
                feed_eligible(
                    post,
                    filter.viewer,
                    inner.follows_author(filter.viewer.user_id, post.author_id),
                )
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(paginate(posts, page))
    }

    async fn archived_posts(&self, author_id: Uuid, page: Page) -> Result<Vec<Post>> {
        let inner = self.read()?;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|post| post.author_id == author_id && post.archived_at.is_some())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.archived_at.cmp(&a.archived_at).then(b.id.cmp(&a.id)));
        Ok(paginate(posts, page))
    }

    async fn bump_view_count(&self, id: Uuid) -> Result<()> {
        let mut inner = self.write()?;
        if let Some(post) = inner.posts.get_mut(&id) {
            post.view_count += 1;
        }
        Ok(())
    }

    async fn find_reposts(&self, filter: &RepostFilter, page: Page) -> Result<Vec<Repost>> {
        let inner = self.read()?;
        let mut reposts: Vec<Repost> = inner
            .reposts
            .values()
            .filter(|repost| match &filter.reposters {
                Some(reposters) => reposters.contains(&repost.user_id),
                None => true,
            })
            .filter(|repost| {
                let Some(post) = inner.posts.get(&repost.post_id) else {
                    return false;
                };
                if let Some(tag) = &filter.tag {
                    if !post.tags.iter().any(|t| t == tag) {
                        return false;
                    }
                }
                feed_eligible(
                    post,
                    filter.viewer,
                    inner.follows_author(filter.viewer.user_id, post.author_id),
                )
            })
            .cloned()
            .collect();
        reposts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(reposts, page))
    }

    async fn find_repost(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Repost>> {
        Ok(self
            .read()?
            .reposts
            .values()
            .find(|repost| repost.user_id == user_id && repost.post_id == post_id)
            .cloned())
    }

    async fn insert_repost(&self, repost: &Repost) -> Result<()> {
        self.write()?.reposts.insert(repost.id, repost.clone());
        Ok(())
    }

    async fn delete_repost(&self, id: Uuid) -> Result<bool> {
        Ok(self.write()?.reposts.remove(&id).is_some())
    }

    async fn repost_count(&self, post_id: Uuid) -> Result<i64> {
        Ok(self
            .read()?
            .reposts
            .values()
            .filter(|repost| repost.post_id == post_id)
            .count() as i64)
    }

    async fn insert_follow(&self, follow: &Follow) -> Result<bool> {
        let mut inner = self.write()?;
        let key = (follow.follower_id, follow.following_id);
        match inner.follows.contains_key(&key) {
            true => Ok(false),
            false => {
                inner.follows.insert(key, follow.clone());
                Ok(true)
            }
        }
    }

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        Ok(self
            .write()?
            .follows
            .remove(&(follower_id, following_id))
            .is_some())
    }

    async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        Ok(self
            .read()?
            .follows
            .contains_key(&(follower_id, following_id)))
    }

    async fn following_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .read()?
            .follows
            .values()
            .filter(|follow| follow.follower_id == follower_id)
            .map(|follow| follow.following_id)
            .collect())
    }

    async fn followers_of(&self, user_id: Uuid, page: Page) -> Result<Vec<Follow>> {
        let inner = self.read()?;
        let mut follows: Vec<Follow> = inner
            .follows
            .values()
            .filter(|follow| follow.following_id == user_id)
            .cloned()
            .collect();
        follows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.follower_id.cmp(&a.follower_id))
        });
        Ok(paginate(follows, page))
    }

    async fn following_of(&self, user_id: Uuid, page: Page) -> Result<Vec<Follow>> {
        let inner = self.read()?;
        let mut follows: Vec<Follow> = inner
            .follows
            .values()
            .filter(|follow| follow.follower_id == user_id)
            .cloned()
            .collect();
        follows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.following_id.cmp(&a.following_id))
        });
        Ok(paginate(follows, page))
    }

    async fn find_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Like>> {
        Ok(self
            .read()?
            .likes
            .values()
            .find(|like| like.user_id == user_id && like.post_id == post_id)
            .cloned())
    }

    async fn insert_like(&self, like: &Like) -> Result<()> {
        self.write()?.likes.insert(like.id, like.clone());
        Ok(())
    }

    async fn delete_like(&self, id: Uuid) -> Result<bool> {
        Ok(self.write()?.likes.remove(&id).is_some())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        Ok(self
            .read()?
            .likes
            .values()
            .filter(|like| like.post_id == post_id)
            .count() as i64)
    }

    async fn find_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Bookmark>> {
        Ok(self
            .read()?
            .bookmarks
            .values()
            .find(|bookmark| bookmark.user_id == user_id && bookmark.post_id == post_id)
            .cloned())
    }

    async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        self.write()?.bookmarks.insert(bookmark.id, bookmark.clone());
        Ok(())
    }

    async fn delete_bookmark(&self, id: Uuid) -> Result<bool> {
        Ok(self.write()?.bookmarks.remove(&id).is_some())
    }

    async fn bookmarks_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Bookmark>> {
        let inner = self.read()?;
        let mut bookmarks: Vec<Bookmark> = inner
            .bookmarks
            .values()
            .filter(|bookmark| bookmark.user_id == user_id)
            .cloned()
            .collect();
        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(bookmarks, page))
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.write()?.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.read()?.comments.get(&id).cloned())
    }

    async fn comments_by_post(&self, post_id: Uuid, page: Page) -> Result<Vec<Comment>> {
        let inner = self.read()?;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(comments, page))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        Ok(self.write()?.comments.remove(&id).is_some())
    }

    async fn engagement_counts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EngagementCounts>> {
        let wanted: HashSet<Uuid> = post_ids.iter().copied().collect();
        let inner = self.read()?;
        let mut counts: HashMap<Uuid, EngagementCounts> = HashMap::new();
        for id in &wanted {
            counts.insert(*id, EngagementCounts::default());
        }
        for like in inner.likes.values() {
            if let Some(entry) = counts.get_mut(&like.post_id) {
                entry.likes += 1;
            }
        }
        for comment in inner.comments.values() {
            if let Some(entry) = counts.get_mut(&comment.post_id) {
                entry.comments += 1;
            }
        }
        for repost in inner.reposts.values() {
            if let Some(entry) = counts.get_mut(&repost.post_id) {
                entry.reposts += 1;
            }
        }
        Ok(counts)
    }

    async fn viewer_marks(&self, viewer_id: Uuid, post_ids: &[Uuid]) -> Result<ViewerMarks> {
        let wanted: HashSet<Uuid> = post_ids.iter().copied().collect();
        let inner = self.read()?;
        let mut marks = ViewerMarks::default();
        for like in inner.likes.values() {
            if like.user_id == viewer_id && wanted.contains(&like.post_id) {
                marks.liked.insert(like.post_id);
            }
        }
        for bookmark in inner.bookmarks.values() {
            if bookmark.user_id == viewer_id && wanted.contains(&bookmark.post_id) {
                marks.bookmarked.insert(bookmark.post_id);
            }
        }
        for repost in inner.reposts.values() {
            if repost.user_id == viewer_id && wanted.contains(&repost.post_id) {
                marks.reposted.insert(repost.post_id);
            }
        }
        Ok(marks)
    }
}
