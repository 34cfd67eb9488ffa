//! Post repository for database operations

use async_trait::async_trait;
use auth::models::AuthorSummary;
use common::error::DatabaseResult;
use sqlx::{FromRow, PgPool};

use crate::{
    models::{NewPost, Post, PostView},
    timeline::FeedAuthorSet,
};

/// Posts with their author summary, newest first
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts authored by any member of `authors`
    async fn list_by_authors(&self, authors: &FeedAuthorSet) -> DatabaseResult<Vec<PostView>>;

    /// Posts authored by `author_id`
    async fn list_by_author(&self, author_id: i64) -> DatabaseResult<Vec<PostView>>;

    async fn insert(&self, post: &NewPost) -> DatabaseResult<Post>;

    /// Delete `post_id` if it is authored by `author_id`; returns rows removed
    async fn delete_own(&self, post_id: i64, author_id: i64) -> DatabaseResult<u64>;
}

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// LEFT JOIN keeps posts whose author row is gone; `author_id` is then NULL
const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.description, p.img, p.created_at,
           u.id AS author_id, u.name AS author_name, u.profile_pic AS author_profile_pic
    FROM posts p
    LEFT JOIN users u ON u.id = p.user_id
"#;

#[derive(FromRow)]
struct PostViewRow {
    #[sqlx(flatten)]
    post: Post,
    author_id: Option<i64>,
    author_name: Option<String>,
    author_profile_pic: Option<String>,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        let author = row.author_id.zip(row.author_name).map(|(id, name)| AuthorSummary {
            id,
            name,
            profile_pic: row.author_profile_pic,
        });

        PostView {
            post: row.post,
            author,
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list_by_authors(&self, authors: &FeedAuthorSet) -> DatabaseResult<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostViewRow>(&format!(
            "{POST_VIEW_SELECT} WHERE p.user_id = ANY($1) ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(authors.ids())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn list_by_author(&self, author_id: i64) -> DatabaseResult<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostViewRow>(&format!(
            "{POST_VIEW_SELECT} WHERE p.user_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn insert(&self, post: &NewPost) -> DatabaseResult<Post> {
        let stored = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, description, img)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, description, img, created_at
            "#,
        )
        .bind(post.user_id)
        .bind(&post.description)
        .bind(&post.img)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn delete_own(&self, post_id: i64, author_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
