//! `/api/comment` handlers

use auth::models::Principal;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{
    error::{ApiError, DatabaseError},
    extract::JsonBody,
    response::ApiResponse,
};

use crate::{
    models::{CreateCommentRequest, NewComment},
    params::{id_from_json, parse_id},
    state::AppState,
};

fn invalid_post_id() -> ApiError {
    ApiError::InvalidParameter("Invalid or missing post ID.".to_string())
}

/// Comments on a post, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_id(Some(post_id.as_str())).ok_or_else(invalid_post_id)?;
    let comments = state.comments.list_by_post(post_id).await?;

    Ok(Json(ApiResponse::collection(
        "Comments fetched successfully",
        comments,
    )))
}

/// Comment on a post as the caller
pub async fn create_comment(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(payload): JsonBody<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = id_from_json(&payload.postid).ok_or_else(invalid_post_id)?;

    let description = payload
        .desc
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::InvalidParameter("Comment text cannot be empty.".to_string()))?;

    let comment = state
        .comments
        .insert(&NewComment {
            user_id: principal.id,
            post_id,
            description,
        })
        .await
        .map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => {
                ApiError::NotFound("Post not found".to_string())
            }
            other => ApiError::from(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Comment created successfully", comment)),
    ))
}
