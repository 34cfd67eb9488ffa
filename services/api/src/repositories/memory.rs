//! In-memory store implementing every api repository, for tests

use async_trait::async_trait;
use auth::models::{AuthorSummary, NewUser, User};
use auth::repositories::{UserRepository, memory::InMemoryUserRepository};
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{CommentRepository, LikeRepository, PostRepository, RelationshipRepository};
use super::relationship::sanitize_ids;
use crate::models::{Comment, CommentView, NewComment, NewPost, Post, PostView};
use crate::timeline::FeedAuthorSet;

#[derive(Default)]
struct Tables {
    next_id: i64,
    // followed id is optional so tests can plant malformed rows
    relationships: Vec<(i64, Option<i64>)>,
    posts: Vec<Post>,
    likes: Vec<(i64, i64)>,
    comments: Vec<Comment>,
    author_set_queries: Vec<Vec<i64>>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Relationship, post, like and comment tables behind one lock, joined
/// against an `InMemoryUserRepository` for author summaries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: InMemoryUserRepository,
    tables: Arc<Mutex<Tables>>,
    unavailable: Arc<AtomicBool>,
    relationships_unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &InMemoryUserRepository {
        &self.users
    }

    /// Fail every call, users included
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
        self.users.set_unavailable(unavailable);
    }

    /// Fail only relationship calls
    pub fn set_relationships_unavailable(&self, unavailable: bool) {
        self.relationships_unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Insert users named after `names`, returning their ids in order
    pub async fn seed_users<const N: usize>(&self, names: [&str; N]) -> [i64; N] {
        let mut ids = [0; N];
        for (slot, name) in ids.iter_mut().zip(names) {
            let user = self
                .users
                .insert(&NewUser {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    password_hash: "unused".to_string(),
                    name: name.to_string(),
                })
                .await
                .expect("seed user");
            *slot = user.id;
        }
        ids
    }

    pub async fn follow(&self, follower: i64, followed: i64) {
        self.tables
            .lock()
            .await
            .relationships
            .push((follower, Some(followed)));
    }

    /// A relationship row whose followed id is NULL
    pub async fn insert_malformed_edge(&self, follower: i64) {
        self.tables.lock().await.relationships.push((follower, None));
    }

    /// Insert a text post and return its id
    pub async fn post(&self, author: i64, text: &str) -> i64 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.posts.push(Post {
            id,
            user_id: author,
            description: Some(text.to_string()),
            img: None,
            created_at: Utc::now(),
        });
        id
    }

    pub async fn post_count(&self) -> usize {
        self.tables.lock().await.posts.len()
    }

    /// Every author set `list_by_authors` was called with, in call order
    pub async fn author_set_queries(&self) -> Vec<Vec<i64>> {
        self.tables.lock().await.author_set_queries.clone()
    }

    fn check_available(&self) -> DatabaseResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Connection(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn check_relationships_available(&self) -> DatabaseResult<()> {
        self.check_available()?;
        if self.relationships_unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Connection(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    async fn user_exists(&self, id: i64) -> DatabaseResult<bool> {
        Ok(self.users.find_by_id(id).await?.is_some())
    }

    async fn author_of(&self, id: i64) -> DatabaseResult<Option<AuthorSummary>> {
        Ok(self
            .users
            .find_by_id(id)
            .await?
            .as_ref()
            .map(AuthorSummary::from))
    }

    async fn post_views(&self, mut posts: Vec<Post>) -> DatabaseResult<Vec<PostView>> {
        posts.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            let author = self.author_of(post.user_id).await?;
            views.push(PostView { post, author });
        }
        Ok(views)
    }
}

fn newest_first(a: (DateTime<Utc>, i64), b: (DateTime<Utc>, i64)) -> std::cmp::Ordering {
    b.cmp(&a)
}

#[async_trait]
impl RelationshipRepository for MemoryStore {
    async fn list_followed_ids(&self, follower_id: i64) -> DatabaseResult<Vec<i64>> {
        self.check_relationships_available()?;
        let tables = self.tables.lock().await;
        let raw = tables
            .relationships
            .iter()
            .filter(|(follower, _)| *follower == follower_id)
            .map(|(_, followed)| *followed);
        Ok(sanitize_ids(raw))
    }

    async fn list_follower_ids(&self, followed_id: i64) -> DatabaseResult<Vec<i64>> {
        self.check_relationships_available()?;
        let tables = self.tables.lock().await;
        let raw = tables
            .relationships
            .iter()
            .rev()
            .filter(|(_, followed)| *followed == Some(followed_id))
            .map(|(follower, _)| Some(*follower));
        Ok(sanitize_ids(raw))
    }

    async fn edge_exists(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<bool> {
        self.check_relationships_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .relationships
            .contains(&(follower_id, Some(followed_id))))
    }

    async fn insert_edge(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<()> {
        self.check_relationships_available()?;
        if !self.user_exists(follower_id).await? || !self.user_exists(followed_id).await? {
            return Err(DatabaseError::ForeignKeyViolation(
                "relationships_followed_user_id_fkey".into(),
            ));
        }

        let mut tables = self.tables.lock().await;
        let edge = (follower_id, Some(followed_id));
        if tables.relationships.contains(&edge) {
            return Err(DatabaseError::UniqueViolation(
                "relationships_follower_user_id_followed_user_id_key".into(),
            ));
        }
        tables.relationships.push(edge);
        Ok(())
    }

    async fn delete_edge(&self, follower_id: i64, followed_id: i64) -> DatabaseResult<u64> {
        self.check_relationships_available()?;
        let mut tables = self.tables.lock().await;
        let before = tables.relationships.len();
        tables
            .relationships
            .retain(|edge| *edge != (follower_id, Some(followed_id)));
        Ok((before - tables.relationships.len()) as u64)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list_by_authors(&self, authors: &FeedAuthorSet) -> DatabaseResult<Vec<PostView>> {
        self.check_available()?;
        let posts = {
            let mut tables = self.tables.lock().await;
            tables.author_set_queries.push(authors.ids());
            tables
                .posts
                .iter()
                .filter(|p| authors.contains(p.user_id))
                .cloned()
                .collect()
        };
        self.post_views(posts).await
    }

    async fn list_by_author(&self, author_id: i64) -> DatabaseResult<Vec<PostView>> {
        self.check_available()?;
        let posts = {
            let tables = self.tables.lock().await;
            tables
                .posts
                .iter()
                .filter(|p| p.user_id == author_id)
                .cloned()
                .collect()
        };
        self.post_views(posts).await
    }

    async fn insert(&self, post: &NewPost) -> DatabaseResult<Post> {
        self.check_available()?;
        if !self.user_exists(post.user_id).await? {
            return Err(DatabaseError::ForeignKeyViolation("posts_user_id_fkey".into()));
        }

        let mut tables = self.tables.lock().await;
        let row = Post {
            id: tables.next_id(),
            user_id: post.user_id,
            description: post.description.clone(),
            img: post.img.clone(),
            created_at: Utc::now(),
        };
        tables.posts.push(row.clone());
        Ok(row)
    }

    async fn delete_own(&self, post_id: i64, author_id: i64) -> DatabaseResult<u64> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let before = tables.posts.len();
        tables
            .posts
            .retain(|p| !(p.id == post_id && p.user_id == author_id));
        let removed = (before - tables.posts.len()) as u64;
        if removed > 0 {
            tables.likes.retain(|(_, post)| *post != post_id);
            tables.comments.retain(|c| c.post_id != post_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn list_user_ids(&self, post_id: i64) -> DatabaseResult<Vec<i64>> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .likes
            .iter()
            .rev()
            .filter(|(_, post)| *post == post_id)
            .map(|(user, _)| *user)
            .collect())
    }

    async fn like_exists(&self, user_id: i64, post_id: i64) -> DatabaseResult<bool> {
        self.check_available()?;
        Ok(self.tables.lock().await.likes.contains(&(user_id, post_id)))
    }

    async fn insert_like(&self, user_id: i64, post_id: i64) -> DatabaseResult<()> {
        self.check_available()?;
        let user_known = self.user_exists(user_id).await?;

        let mut tables = self.tables.lock().await;
        if !user_known || !tables.posts.iter().any(|p| p.id == post_id) {
            return Err(DatabaseError::ForeignKeyViolation("likes_post_id_fkey".into()));
        }
        if tables.likes.contains(&(user_id, post_id)) {
            return Err(DatabaseError::UniqueViolation(
                "likes_user_id_post_id_key".into(),
            ));
        }
        tables.likes.push((user_id, post_id));
        Ok(())
    }

    async fn delete_like(&self, user_id: i64, post_id: i64) -> DatabaseResult<u64> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let before = tables.likes.len();
        tables.likes.retain(|edge| *edge != (user_id, post_id));
        Ok((before - tables.likes.len()) as u64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_by_post(&self, post_id: i64) -> DatabaseResult<Vec<CommentView>> {
        self.check_available()?;
        let mut comments: Vec<Comment> = {
            let tables = self.tables.lock().await;
            tables
                .comments
                .iter()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect()
        };
        comments.sort_by(|a, b| newest_first((a.created_at, a.id), (b.created_at, b.id)));

        let mut views = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = self.author_of(comment.user_id).await?;
            views.push(CommentView { comment, author });
        }
        Ok(views)
    }

    async fn insert(&self, comment: &NewComment) -> DatabaseResult<Comment> {
        self.check_available()?;
        let user_known = self.user_exists(comment.user_id).await?;

        let mut tables = self.tables.lock().await;
        if !user_known || !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(DatabaseError::ForeignKeyViolation(
                "comments_post_id_fkey".into(),
            ));
        }

        let row = Comment {
            id: tables.next_id(),
            description: comment.description.clone(),
            user_id: comment.user_id,
            post_id: comment.post_id,
            created_at: Utc::now(),
        };
        tables.comments.push(row.clone());
        Ok(row)
    }
}

/// Look a seeded user up by id, for assertions
pub async fn seeded_user(store: &MemoryStore, id: i64) -> User {
    store
        .users()
        .find_by_id(id)
        .await
        .expect("store available")
        .expect("user seeded")
}
