//! Application state shared across handlers

use auth::{AuthState, jwt::TokenService, repositories::UserRepository};
use axum::extract::FromRef;
use std::sync::Arc;

use crate::{
    repositories::{CommentRepository, LikeRepository, PostRepository, RelationshipRepository},
    timeline::TimelineAssembler,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub users: Arc<dyn UserRepository>,
    pub relationships: Arc<dyn RelationshipRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub timeline: TimelineAssembler,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        users: Arc<dyn UserRepository>,
        relationships: Arc<dyn RelationshipRepository>,
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        let timeline = TimelineAssembler::new(relationships.clone(), posts.clone());
        Self {
            tokens,
            users,
            relationships,
            posts,
            likes,
            comments,
            timeline,
        }
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        AuthState {
            tokens: state.tokens.clone(),
            users: state.users.clone(),
        }
    }
}
