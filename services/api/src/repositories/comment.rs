//! Comment repository for database operations

use async_trait::async_trait;
use auth::models::AuthorSummary;
use common::error::DatabaseResult;
use sqlx::{FromRow, PgPool};

use crate::models::{Comment, CommentView, NewComment};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments on `post_id` with their author, newest first
    async fn list_by_post(&self, post_id: i64) -> DatabaseResult<Vec<CommentView>>;

    async fn insert(&self, comment: &NewComment) -> DatabaseResult<Comment>;
}

/// PostgreSQL-backed comment repository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CommentViewRow {
    #[sqlx(flatten)]
    comment: Comment,
    author_id: Option<i64>,
    author_name: Option<String>,
    author_profile_pic: Option<String>,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        let author = row.author_id.zip(row.author_name).map(|(id, name)| AuthorSummary {
            id,
            name,
            profile_pic: row.author_profile_pic,
        });

        CommentView {
            comment: row.comment,
            author,
        }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_by_post(&self, post_id: i64) -> DatabaseResult<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT c.id, c.description, c.user_id, c.post_id, c.created_at,
                   u.id AS author_id, u.name AS author_name, u.profile_pic AS author_profile_pic
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentView::from).collect())
    }

    async fn insert(&self, comment: &NewComment) -> DatabaseResult<Comment> {
        let stored = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (description, user_id, post_id)
            VALUES ($1, $2, $3)
            RETURNING id, description, user_id, post_id, created_at
            "#,
        )
        .bind(&comment.description)
        .bind(comment.user_id)
        .bind(comment.post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }
}
