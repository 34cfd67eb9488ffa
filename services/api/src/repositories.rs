//! Repositories for database operations

pub mod comment;
pub mod like;
pub mod post;
pub mod relationship;

#[cfg(test)]
pub mod memory;

pub use comment::{CommentRepository, PgCommentRepository};
pub use like::{LikeRepository, PgLikeRepository};
pub use post::{PgPostRepository, PostRepository};
pub use relationship::{PgRelationshipRepository, RelationshipRepository};
