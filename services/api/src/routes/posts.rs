//! `/api/post` handlers

use auth::models::Principal;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{
    error::ApiError,
    extract::{JsonBody, QueryParams},
    response::ApiResponse,
};
use tracing::info;

use crate::{
    models::{CreatePostRequest, PostQuery},
    params::parse_id,
    state::AppState,
    timeline::TimelineRequest,
};

/// Feed of the caller, or one user's posts with `?profileUserid=`
pub async fn list_posts(
    State(state): State<AppState>,
    principal: Principal,
    QueryParams(query): QueryParams<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = TimelineRequest::from_param(query.profile_userid.as_deref())?;
    let posts = state.timeline.assemble(&principal, request).await?;

    Ok(Json(ApiResponse::collection(
        "Posts fetched successfully",
        posts,
    )))
}

/// Create a post authored by the caller
pub async fn create_post(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(payload): JsonBody<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_post = payload.validate(principal.id)?;
    let post = state.posts.insert(&new_post).await?;

    info!("User {} created post {}", principal.id, post.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Post created successfully", post)),
    ))
}

/// Delete one of the caller's own posts
pub async fn delete_post(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_id(Some(id.as_str()))
        .ok_or_else(|| ApiError::InvalidParameter("Invalid or missing post ID.".to_string()))?;

    if state.posts.delete_own(post_id, principal.id).await? == 0 {
        return Err(ApiError::NotFound(
            "Post not found or not owned by you.".to_string(),
        ));
    }

    Ok(Json(ApiResponse::message("Post deleted successfully")))
}
