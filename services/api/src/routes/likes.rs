//! `/api/like?postid=` handlers

use auth::models::Principal;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use common::{error::ApiError, extract::QueryParams, response::ApiResponse};

use crate::{edges, models::LikeQuery, state::AppState};

pub async fn list_likes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LikeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users = edges::likers(state.likes.as_ref(), query.postid.as_deref()).await?;

    Ok(Json(ApiResponse::collection(
        "Likes fetched successfully",
        users,
    )))
}

pub async fn add_like(
    State(state): State<AppState>,
    principal: Principal,
    QueryParams(query): QueryParams<LikeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    edges::like(state.likes.as_ref(), principal.id, query.postid.as_deref()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Post liked successfully")),
    ))
}

pub async fn remove_like(
    State(state): State<AppState>,
    principal: Principal,
    QueryParams(query): QueryParams<LikeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    edges::unlike(state.likes.as_ref(), principal.id, query.postid.as_deref()).await?;

    Ok(Json(ApiResponse::message("Post unliked successfully")))
}
