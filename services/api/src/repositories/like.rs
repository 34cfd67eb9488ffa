//! Like-edge repository over the `likes` table

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

use super::relationship::sanitize_ids;

/// `(user, post)` like edges
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Ids of the users who liked `post_id`
    async fn list_user_ids(&self, post_id: i64) -> DatabaseResult<Vec<i64>>;

    async fn like_exists(&self, user_id: i64, post_id: i64) -> DatabaseResult<bool>;

    async fn insert_like(&self, user_id: i64, post_id: i64) -> DatabaseResult<()>;

    /// Delete the like, returning the number of rows removed
    async fn delete_like(&self, user_id: i64, post_id: i64) -> DatabaseResult<u64>;
}

/// PostgreSQL-backed like repository
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    /// Create a new like repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn list_user_ids(&self, post_id: i64) -> DatabaseResult<Vec<i64>> {
        let rows: Vec<Option<i64>> = sqlx::query_scalar(
            "SELECT user_id FROM likes WHERE post_id = $1 ORDER BY created_at DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sanitize_ids(rows))
    }

    async fn like_exists(&self, user_id: i64, post_id: i64) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_like(&self, user_id: i64, post_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO likes (user_id, post_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_like(&self, user_id: i64, post_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
