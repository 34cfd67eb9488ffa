//! Post models

use auth::models::AuthorSummary;
use chrono::{DateTime, Utc};
use common::error::ApiError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    #[serde(rename = "userid")]
    pub user_id: i64,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub img: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author, as listed in feeds and profiles.
///
/// `author` is `None` when the author row could not be joined; the post is
/// still returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<AuthorSummary>,
}

/// Validated post ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: i64,
    pub description: Option<String>,
    pub img: Option<String>,
}

/// Request for post creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostRequest {
    pub desc: Option<String>,
    pub img: Option<String>,
}

impl CreatePostRequest {
    /// Trim both fields, store blanks as NULL, and require at least one
    pub fn validate(self, user_id: i64) -> Result<NewPost, ApiError> {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let description = clean(self.desc);
        let img = clean(self.img);

        if description.is_none() && img.is_none() {
            return Err(ApiError::InvalidParameter(
                "Post must contain text or an image.".to_string(),
            ));
        }

        Ok(NewPost {
            user_id,
            description,
            img,
        })
    }
}

/// Query parameters for post listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    #[serde(rename = "profileUserid")]
    pub profile_userid: Option<String>,
}
