//! In-memory user repository for tests

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::UserRepository;
use crate::models::{NewUser, ProfileUpdate, User};

#[derive(Default)]
struct Users {
    next_id: i64,
    rows: Vec<User>,
}

/// `UserRepository` over a vector, with the same uniqueness rules as the
/// `users` table and a switch to simulate an unreachable store.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Users>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail like a lost connection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Remove a user row, as an administrator would out of band
    pub async fn remove(&self, id: i64) {
        self.users.lock().await.rows.retain(|u| u.id != id);
    }

    fn check_available(&self) -> DatabaseResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Connection(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.check_available()?;
        let users = self.users.lock().await;
        Ok(users.rows.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        self.check_available()?;
        let users = self.users.lock().await;
        Ok(users.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        self.check_available()?;
        let users = self.users.lock().await;
        Ok(users.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        self.check_available()?;
        let mut users = self.users.lock().await;

        if users.rows.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".into()));
        }
        if users.rows.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".into()));
        }

        users.next_id += 1;
        let user = User {
            id: users.next_id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            name: new_user.name.clone(),
            profile_pic: None,
            cover_pic: None,
            city: None,
            website: None,
            created_at: Utc::now(),
        };
        users.rows.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: i64,
        update: &ProfileUpdate,
    ) -> DatabaseResult<Option<User>> {
        self.check_available()?;
        let mut users = self.users.lock().await;

        let Some(user) = users.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(city) = &update.city {
            user.city = Some(city.clone());
        }
        if let Some(website) = &update.website {
            user.website = Some(website.clone());
        }
        if let Some(pic) = &update.profile_pic {
            user.profile_pic = Some(pic.clone());
        }
        if let Some(pic) = &update.cover_pic {
            user.cover_pic = Some(pic.clone());
        }

        Ok(Some(user.clone()))
    }
}
