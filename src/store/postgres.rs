use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::engagement::{Bookmark, Comment, Like, Repost};
use crate::domain::post::{Post, PostVisibility};
use crate::domain::social_graph::Follow;
use crate::domain::user::{User, Viewer};
use crate::infra::db::Db;
use crate::store::{EngagementCounts, Page, PostFilter, RepostFilter, Store, ViewerMarks};

const POST_COLUMNS: &str = "p.id, p.author_id, p.title, p.content, p.rendered_html, p.tags, \
     p.visibility::text AS visibility, p.is_published, p.published_at, p.archived_at, \
     p.view_count, p.created_at";

/// SQL-backed [`Store`]. Every filter is bound, never interpolated; the
/// dynamic parts are assembled with [`QueryBuilder`] from constant fragments
/// that mirror `app::visibility::feed_eligible` exactly.
#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Feed-path visibility push-down on a `posts p` alias: published with a
/// publication timestamp, not archived, and within the viewer's tier.
/// Privileged viewers skip everything past the publication check.
fn push_feed_visibility(builder: &mut QueryBuilder<'_, Postgres>, viewer: Viewer) {
    builder.push(" AND p.is_published = TRUE AND p.published_at IS NOT NULL");
    if viewer.privileged {
        return;
    }
    builder.push(" AND p.archived_at IS NULL");
    match viewer.user_id {
        Some(viewer_id) => {
            builder.push(" AND (p.visibility = 'public' OR p.author_id = ");
            builder.push_bind(viewer_id);
            builder.push(
                " OR (p.visibility = 'followers_only' AND EXISTS ( \
                 SELECT 1 FROM follows f WHERE f.follower_id = ",
            );
            builder.push_bind(viewer_id);
            builder.push(" AND f.following_id = p.author_id)))");
        }
        None => {
            builder.push(" AND p.visibility = 'public'");
        }
    }
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: Page) {
    builder.push(" LIMIT ");
    builder.push_bind(page.limit);
    builder.push(" OFFSET ");
    builder.push_bind(page.offset);
}

fn post_from_row(row: &PgRow) -> Result<Post> {
    let visibility: String = row.get("visibility");
    let visibility = PostVisibility::from_db(&visibility)
        .ok_or_else(|| anyhow::anyhow!("unknown post visibility: {}", visibility))?;
    Ok(Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        rendered_html: row.get("rendered_html"),
        tags: row.get("tags"),
        visibility,
        is_published: row.get("is_published"),
        published_at: row.get("published_at"),
        archived_at: row.get("archived_at"),
        view_count: row.get("view_count"),
        created_at: row.get("created_at"),
    })
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        handle: row.get("handle"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
    }
}

fn repost_from_row(row: &PgRow) -> Repost {
    Repost {
        id: row.get("id"),
        user_id: row.get("user_id"),
        post_id: row.get("post_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, handle, display_name, bio, avatar_url, is_admin, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.handle)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, handle, display_name, bio, avatar_url, is_admin, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(|row| user_from_row(&row)))
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, handle, display_name, bio, avatar_url, is_admin, created_at \
             FROM users WHERE handle = $1",
        )
        .bind(handle)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(|row| user_from_row(&row)))
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            "SELECT id, handle, display_name, bio, avatar_url, is_admin, created_at \
             FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, title, content, rendered_html, tags, visibility, \
                                is_published, published_at, archived_at, view_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7::post_visibility, $8, $9, $10, $11, $12)",
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.rendered_html)
        .bind(&post.tags)
        .bind(post.visibility.as_db())
        .bind(post.is_published)
        .bind(post.published_at)
        .bind(post.archived_at)
        .bind(post.view_count)
        .bind(post.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE posts \
             SET title = $2, content = $3, rendered_html = $4, tags = $5, \
                 visibility = $6::post_visibility, is_published = $7, published_at = $8, \
                 archived_at = $9 \
             WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.rendered_html)
        .bind(&post.tags)
        .bind(post.visibility.as_db())
        .bind(post.is_published)
        .bind(post.published_at)
        .bind(post.archived_at)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts p WHERE p.id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        row.map(|row| post_from_row(&row)).transpose()
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts p WHERE p.id = ANY($1)",
            POST_COLUMNS
        ))
        .bind(ids)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn find_posts(&self, filter: &PostFilter, page: Page) -> Result<Vec<Post>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM posts p WHERE TRUE",
            POST_COLUMNS
        ));
        push_feed_visibility(&mut builder, filter.viewer);
        if let Some(authors) = &filter.authors {
            builder.push(" AND p.author_id = ANY(");
            builder.push_bind(authors.clone());
            builder.push(")");
        }
        if let Some(tag) = &filter.tag {
            builder.push(" AND ");
            builder.push_bind(tag.clone());
            builder.push(" = ANY(p.tags)");
        }
        builder.push(" ORDER BY p.published_at DESC, p.id DESC");
        push_page(&mut builder, page);

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn archived_posts(&self, author_id: Uuid, page: Page) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts p \
             WHERE p.author_id = $1 AND p.archived_at IS NOT NULL \
             ORDER BY p.archived_at DESC, p.id DESC \
             LIMIT $2 OFFSET $3",
            POST_COLUMNS
        ))
        .bind(author_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn bump_view_count(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn find_reposts(&self, filter: &RepostFilter, page: Page) -> Result<Vec<Repost>> {
        let mut builder = QueryBuilder::new(
            "SELECT r.id, r.user_id, r.post_id, r.created_at \
             FROM reposts r JOIN posts p ON p.id = r.post_id WHERE TRUE",
        );
        push_feed_visibility(&mut builder, filter.viewer);
        if let Some(reposters) = &filter.reposters {
            builder.push(" AND r.user_id = ANY(");
            builder.push_bind(reposters.clone());
            builder.push(")");
        }
        if let Some(tag) = &filter.tag {
            builder.push(" AND ");
            builder.push_bind(tag.clone());
            builder.push(" = ANY(p.tags)");
        }
        builder.push(" ORDER BY r.created_at DESC, r.id DESC");
        push_page(&mut builder, page);

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        Ok(rows.iter().map(repost_from_row).collect())
    }

    async fn find_repost(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Repost>> {
        let row = sqlx::query(
            "SELECT id, user_id, post_id, created_at \
             FROM reposts WHERE user_id = $1 AND post_id = $2",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(|row| repost_from_row(&row)))
    }

    async fn insert_repost(&self, repost: &Repost) -> Result<()> {
        sqlx::query(
            "INSERT INTO reposts (id, user_id, post_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT DO NOTHING",
        )
        .bind(repost.id)
        .bind(repost.user_id)
        .bind(repost.post_id)
        .bind(repost.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_repost(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reposts WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn repost_count(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reposts WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn insert_follow(&self, follow: &Follow) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, following_id, created_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(follow.follower_id)
        .bind(follow.following_id)
        .bind(follow.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower_id)
                .bind(following_id)
                .execute(self.db.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(exists)
    }

    async fn following_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT following_id FROM follows WHERE follower_id = $1")
                .bind(follower_id)
                .fetch_all(self.db.pool())
                .await?;
        Ok(ids)
    }

    async fn followers_of(&self, user_id: Uuid, page: Page) -> Result<Vec<Follow>> {
        let rows = sqlx::query(
            "SELECT follower_id, following_id, created_at \
             FROM follows WHERE following_id = $1 \
             ORDER BY created_at DESC, follower_id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| Follow {
                follower_id: row.get("follower_id"),
                following_id: row.get("following_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn following_of(&self, user_id: Uuid, page: Page) -> Result<Vec<Follow>> {
        let rows = sqlx::query(
            "SELECT follower_id, following_id, created_at \
             FROM follows WHERE follower_id = $1 \
             ORDER BY created_at DESC, following_id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| Follow {
                follower_id: row.get("follower_id"),
                following_id: row.get("following_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn find_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Like>> {
        let row = sqlx::query(
            "SELECT id, user_id, post_id, created_at \
             FROM likes WHERE user_id = $1 AND post_id = $2",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(|row| Like {
            id: row.get("id"),
            user_id: row.get("user_id"),
            post_id: row.get("post_id"),
            created_at: row.get("created_at"),
        }))
    }

    async fn insert_like(&self, like: &Like) -> Result<()> {
        sqlx::query(
            "INSERT INTO likes (id, user_id, post_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT DO NOTHING",
        )
        .bind(like.id)
        .bind(like.user_id)
        .bind(like.post_id)
        .bind(like.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_like(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn find_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Bookmark>> {
        let row = sqlx::query(
            "SELECT id, user_id, post_id, created_at \
             FROM bookmarks WHERE user_id = $1 AND post_id = $2",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(|row| Bookmark {
            id: row.get("id"),
            user_id: row.get("user_id"),
            post_id: row.get("post_id"),
            created_at: row.get("created_at"),
        }))
    }

    async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        sqlx::query(
            "INSERT INTO bookmarks (id, user_id, post_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT DO NOTHING",
        )
        .bind(bookmark.id)
        .bind(bookmark.user_id)
        .bind(bookmark.post_id)
        .bind(bookmark.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_bookmark(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn bookmarks_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query(
            "SELECT id, user_id, post_id, created_at \
             FROM bookmarks WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| Bookmark {
                id: row.get("id"),
                user_id: row.get("user_id"),
                post_id: row.get("post_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, body, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.body)
        .bind(comment.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, post_id, author_id, body, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.map(|row| Comment {
            id: row.get("id"),
            post_id: row.get("post_id"),
            author_id: row.get("author_id"),
            body: row.get("body"),
            created_at: row.get("created_at"),
        }))
    }

    async fn comments_by_post(&self, post_id: Uuid, page: Page) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, post_id, author_id, body, created_at \
             FROM comments WHERE post_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3",
        )
        .bind(post_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                author_id: row.get("author_id"),
                body: row.get("body"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn engagement_counts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, EngagementCounts>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT p.id, \
                (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count, \
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count, \
                (SELECT COUNT(*) FROM reposts r WHERE r.post_id = p.id) AS repost_count \
             FROM posts p WHERE p.id = ANY($1)",
        )
        .bind(post_ids)
        .fetch_all(self.db.pool())
        .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            counts.insert(
                row.get::<Uuid, _>("id"),
                EngagementCounts {
                    likes: row.get("like_count"),
                    comments: row.get("comment_count"),
                    reposts: row.get("repost_count"),
                },
            );
        }
        Ok(counts)
    }

    async fn viewer_marks(&self, viewer_id: Uuid, post_ids: &[Uuid]) -> Result<ViewerMarks> {
        if post_ids.is_empty() {
            return Ok(ViewerMarks::default());
        }
        let liked: Vec<Uuid> = sqlx::query_scalar(
            "SELECT post_id FROM likes WHERE user_id = $1 AND post_id = ANY($2)",
        )
        .bind(viewer_id)
        .bind(post_ids)
        .fetch_all(self.db.pool())
        .await?;
        let bookmarked: Vec<Uuid> = sqlx::query_scalar(
            "SELECT post_id FROM bookmarks WHERE user_id = $1 AND post_id = ANY($2)",
        )
        .bind(viewer_id)
        .bind(post_ids)
        .fetch_all(self.db.pool())
        .await?;
        let reposted: Vec<Uuid> = sqlx::query_scalar(
            "SELECT post_id FROM reposts WHERE user_id = $1 AND post_id = ANY($2)",
        )
        .bind(viewer_id)
        .bind(post_ids)
        .fetch_all(self.db.pool())
        .await?;

        Ok(ViewerMarks {
            liked: liked.into_iter().collect(),
            bookmarked: bookmarked.into_iter().collect(),
            reposted: reposted.into_iter().collect(),
        })
    }
}
