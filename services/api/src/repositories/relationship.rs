//! Follow-edge repository over the `relationships` table

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

/// Directed `follower -> followed` edges
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Ids followed by `follower_id`. Null or non-positive ids in the
    /// underlying rows are dropped here, so callers only see valid ids.
    async fn list_followed_ids(&self, follower_id: i64) -> DatabaseResult<Vec<i64>>;

    /// Ids of the users following `followed_id`
    async fn list_follower_ids(&self, followed_id: i64) -> DatabaseResult<Vec<i64>>;

    async fn edge_exists(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<bool>;

    async fn insert_edge(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<()>;

    /// Delete the edge, returning the number of rows removed
    async fn delete_edge(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<u64>;
}

/// Keep only usable ids from a raw id column
pub fn sanitize_ids(raw: impl IntoIterator<Item = Option<i64>>) -> Vec<i64> {
    raw.into_iter().flatten().filter(|id| *id > 0).collect()
}

/// PostgreSQL-backed relationship repository
#[derive(Clone)]
pub struct PgRelationshipRepository {
    pool: PgPool,
}

impl PgRelationshipRepository {
    /// Create a new relationship repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for PgRelationshipRepository {
    async fn list_followed_ids(&self, follower_id: i64) -> DatabaseResult<Vec<i64>> {
        let rows: Vec<Option<i64>> = sqlx::query_scalar(
            r#"
            SELECT followed_user_id
            FROM relationships
            WHERE follower_user_id = $1
            "#,
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sanitize_ids(rows))
    }

    async fn list_follower_ids(&self, followed_id: i64) -> DatabaseResult<Vec<i64>> {
        let rows: Vec<Option<i64>> = sqlx::query_scalar(
            r#"
            SELECT follower_user_id
            FROM relationships
            WHERE followed_user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(followed_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sanitize_ids(rows))
    }

    async fn edge_exists(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM relationships
                WHERE follower_user_id = $1 AND followed_user_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_edge(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO relationships (follower_user_id, followed_user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_edge(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM relationships
            WHERE follower_user_id = $1 AND followed_user_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
