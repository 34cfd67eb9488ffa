//! API models for request and response payloads

use serde::Deserialize;

pub mod comment;
pub mod post;

pub use comment::{Comment, CommentView, CreateCommentRequest, NewComment};
pub use post::{CreatePostRequest, NewPost, Post, PostQuery, PostView};

/// Query parameters addressing a follow edge
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelationshipQuery {
    #[serde(rename = "followedUserid")]
    pub followed_userid: Option<String>,
}

/// Query parameters addressing a like edge
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikeQuery {
    pub postid: Option<String>,
}
