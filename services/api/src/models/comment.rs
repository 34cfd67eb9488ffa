//! Comment models

use auth::models::AuthorSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Comment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "userid")]
    pub user_id: i64,
    #[serde(rename = "postid")]
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author; `author` degrades to `None` like posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<AuthorSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub user_id: i64,
    pub post_id: i64,
    pub description: String,
}

/// Request for comment creation; `postid` may arrive as number or string
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub desc: Option<String>,
    #[serde(default)]
    pub postid: serde_json::Value,
}
