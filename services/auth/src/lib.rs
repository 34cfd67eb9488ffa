//! Authentication for the social backend
//!
//! Stateless cookie sessions: [`jwt::TokenService`] signs the principal's
//! public claims at login, [`middleware::session_middleware`] verifies them
//! on every protected request, and [`routes`] serves `/api/auth/*`.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use crate::{jwt::TokenService, repositories::UserRepository};

/// State needed by the authentication routes
#[derive(Clone)]
pub struct AuthState {
    pub tokens: TokenService,
    pub users: Arc<dyn UserRepository>,
}
