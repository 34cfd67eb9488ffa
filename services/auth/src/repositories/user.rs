//! User repository for database operations

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;
use tracing::info;

use crate::models::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, name, profile_pic, cover_pic, \
                            city, website, created_at";

/// Point lookups and writes against the `users` table
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    /// Find a user by email (already normalized by the caller)
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>>;

    /// Insert a new user, returning the stored row
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Apply the non-empty fields of `update` to the user's own row.
    /// Returns `None` when no row matched.
    async fn update_profile(&self, id: i64, update: &ProfileUpdate)
    -> DatabaseResult<Option<User>>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> DatabaseResult<Option<User>> {
        // NULL parameters leave the column untouched
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name        = COALESCE($2, name),
                city        = COALESCE($3, city),
                website     = COALESCE($4, website),
                profile_pic = COALESCE($5, profile_pic),
                cover_pic   = COALESCE($6, cover_pic)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.city)
        .bind(&update.website)
        .bind(&update.profile_pic)
        .bind(&update.cover_pic)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
