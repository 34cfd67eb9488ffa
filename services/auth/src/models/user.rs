//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity as stored in the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub profile_pic: Option<String>,
    pub cover_pic: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public claims of this user, without the password hash
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            profile_pic: self.profile_pic.clone(),
            cover_pic: self.cover_pic.clone(),
            city: self.city.clone(),
            website: self.website.clone(),
        }
    }
}

/// Authenticated identity attached to a request.
///
/// Rebuilt from a verified session token on every request; it is also the
/// public profile view of a user, so it never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub profile_pic: Option<String>,
    pub cover_pic: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
}

/// New user creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Profile fields a user may change on their own row
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub profile_pic: Option<String>,
    pub cover_pic: Option<String>,
}

impl ProfileUpdate {
    /// Trim every field and drop the blank ones
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: clean(self.name),
            city: clean(self.city),
            website: clean(self.website),
            profile_pic: clean(self.profile_pic),
            cover_pic: clean(self.cover_pic),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.website.is_none()
            && self.profile_pic.is_none()
            && self.cover_pic.is_none()
    }
}

/// Minimal author view joined onto posts and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i64,
    pub name: String,
    pub profile_pic: Option<String>,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            profile_pic: user.profile_pic.clone(),
        }
    }
}
