//! Follow and like edge mutations
//!
//! Both are check-then-insert sequences and are not atomic. When two
//! requests race past the existence check, the unique constraint rejects
//! the second insert and that rejection is reported as `AlreadyExists`.

use common::error::{ApiError, DatabaseError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    params::parse_id,
    repositories::{LikeRepository, RelationshipRepository},
};

/// Errors from edge mutations
#[derive(Error, Debug)]
pub enum EdgeError {
    /// The target id is missing or not a positive integer
    #[error("{0}")]
    InvalidTarget(&'static str),

    #[error("You cannot follow yourself.")]
    SelfFollowNotAllowed,

    /// The edge is already present
    #[error("{0}")]
    AlreadyExists(&'static str),

    /// No edge to remove, or the target entity does not exist
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

impl From<EdgeError> for ApiError {
    fn from(err: EdgeError) -> Self {
        match err {
            EdgeError::InvalidTarget(msg) => ApiError::InvalidParameter(msg.to_string()),
            EdgeError::SelfFollowNotAllowed => {
                ApiError::InvalidParameter(EdgeError::SelfFollowNotAllowed.to_string())
            }
            EdgeError::AlreadyExists(msg) => ApiError::Conflict(msg.to_string()),
            EdgeError::NotFound(msg) => ApiError::NotFound(msg.to_string()),
            EdgeError::Store(err) => ApiError::StoreUnavailable(err),
        }
    }
}

const INVALID_FOLLOWED: &str = "Invalid or missing followedUserid ID.";
const INVALID_POST: &str = "Invalid or missing post ID.";
const ALREADY_FOLLOWING: &str = "Already following this user";
const ALREADY_LIKED: &str = "Post already liked";

/// Map an insert failure, treating a lost race as a duplicate
fn classify_insert(
    err: DatabaseError,
    duplicate: &'static str,
    missing: &'static str,
) -> EdgeError {
    match err {
        DatabaseError::UniqueViolation(constraint) => {
            warn!("Duplicate edge rejected by constraint {}", constraint);
            EdgeError::AlreadyExists(duplicate)
        }
        DatabaseError::ForeignKeyViolation(_) => EdgeError::NotFound(missing),
        other => EdgeError::Store(other),
    }
}

/// Ids of the users following the user named by `raw_followed`
pub async fn followers(
    relationships: &dyn RelationshipRepository,
    raw_followed: Option<&str>,
) -> Result<Vec<i64>, EdgeError> {
    let followed = parse_id(raw_followed).ok_or(EdgeError::InvalidTarget(INVALID_FOLLOWED))?;
    Ok(relationships.list_follower_ids(followed).await?)
}

/// Create the edge `follower -> followed`
pub async fn follow(
    relationships: &dyn RelationshipRepository,
    follower: i64,
    raw_followed: Option<&str>,
) -> Result<i64, EdgeError> {
    let followed = parse_id(raw_followed).ok_or(EdgeError::InvalidTarget(INVALID_FOLLOWED))?;

    if follower == followed {
        return Err(EdgeError::SelfFollowNotAllowed);
    }

    if relationships.edge_exists(follower, followed).await? {
        return Err(EdgeError::AlreadyExists(ALREADY_FOLLOWING));
    }

    relationships
        .insert_edge(follower, followed)
        .await
        .map_err(|e| classify_insert(e, ALREADY_FOLLOWING, "User not found"))?;

    debug!("User {} now follows {}", follower, followed);
    Ok(followed)
}

/// Remove the edge `follower -> followed`
pub async fn unfollow(
    relationships: &dyn RelationshipRepository,
    follower: i64,
    raw_followed: Option<&str>,
) -> Result<i64, EdgeError> {
    let followed = parse_id(raw_followed).ok_or(EdgeError::InvalidTarget(INVALID_FOLLOWED))?;

    if relationships.delete_edge(follower, followed).await? == 0 {
        return Err(EdgeError::NotFound("No follower found to remove."));
    }

    debug!("User {} unfollowed {}", follower, followed);
    Ok(followed)
}

/// Ids of the users who liked the post named by `raw_post`
pub async fn likers(
    likes: &dyn LikeRepository,
    raw_post: Option<&str>,
) -> Result<Vec<i64>, EdgeError> {
    let post = parse_id(raw_post).ok_or(EdgeError::InvalidTarget(INVALID_POST))?;
    Ok(likes.list_user_ids(post).await?)
}

/// Create the edge `user -> post`
pub async fn like(
    likes: &dyn LikeRepository,
    user: i64,
    raw_post: Option<&str>,
) -> Result<i64, EdgeError> {
    let post = parse_id(raw_post).ok_or(EdgeError::InvalidTarget(INVALID_POST))?;

    if likes.like_exists(user, post).await? {
        return Err(EdgeError::AlreadyExists(ALREADY_LIKED));
    }

    likes
        .insert_like(user, post)
        .await
        .map_err(|e| classify_insert(e, ALREADY_LIKED, "Post not found"))?;

    Ok(post)
}

/// Remove the edge `user -> post`
pub async fn unlike(
    likes: &dyn LikeRepository,
    user: i64,
    raw_post: Option<&str>,
) -> Result<i64, EdgeError> {
    let post = parse_id(raw_post).ok_or(EdgeError::InvalidTarget(INVALID_POST))?;

    if likes.delete_like(user, post).await? == 0 {
        return Err(EdgeError::NotFound("No like found to remove for this post."));
    }

    Ok(post)
}
