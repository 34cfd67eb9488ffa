//! API service routes

use auth::{AuthState, middleware::session_middleware};
use axum::{
    Json, Router,
    extract::FromRef,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::json;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use common::error::ApiError;
use tracing::warn;

use crate::{config::ServerConfig, state::AppState};

mod comments;
mod likes;
mod posts;
mod relationships;
mod users;

/// Create the router for the API service
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let protected_routes = Router::new()
        .route("/api/post", get(posts::list_posts).post(posts::create_post))
        .route("/api/post/:id", delete(posts::delete_post))
        .route(
            "/api/relationship",
            get(relationships::list_followers)
                .post(relationships::follow)
                .delete(relationships::unfollow),
        )
        .route(
            "/api/like",
            get(likes::list_likes)
                .post(likes::add_like)
                .delete(likes::remove_like),
        )
        .route("/api/comment", post(comments::create_comment))
        .route("/api/comment/:post_id", get(comments::list_comments))
        .route("/api/user/find/:userid", get(users::find_user))
        .route("/api/user/update", put(users::update_user))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            session_middleware,
        ));

    let auth_routes = auth::routes::create_router(AuthState::from_ref(&state));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
        .nest("/api/auth", auth_routes)
        .layer(cors_layer(&server.allowed_origins()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds),
        ))
        .layer(middleware::map_response(timeout_envelope))
        .layer(TraceLayer::new_for_http())
}

/// Give the bodiless 408 produced by the timeout layer the error envelope
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return ApiError::RequestTimeout.into_response();
    }
    response
}

/// Credentialed CORS for an explicit origin list
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "social-api"
    }))
}
