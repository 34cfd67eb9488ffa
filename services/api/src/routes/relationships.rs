//! `/api/relationship?followedUserid=` handlers

use auth::models::Principal;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use common::{error::ApiError, extract::QueryParams, response::ApiResponse};

use crate::{edges, models::RelationshipQuery, state::AppState};

pub async fn list_followers(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RelationshipQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let followers =
        edges::followers(state.relationships.as_ref(), query.followed_userid.as_deref()).await?;

    Ok(Json(ApiResponse::collection(
        "Followers fetched successfully",
        followers,
    )))
}

pub async fn follow(
    State(state): State<AppState>,
    principal: Principal,
    QueryParams(query): QueryParams<RelationshipQuery>,
) -> Result<impl IntoResponse, ApiError> {
    edges::follow(
        state.relationships.as_ref(),
        principal.id,
        query.followed_userid.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Followed successfully")),
    ))
}

pub async fn unfollow(
    State(state): State<AppState>,
    principal: Principal,
    QueryParams(query): QueryParams<RelationshipQuery>,
) -> Result<impl IntoResponse, ApiError> {
    edges::unfollow(
        state.relationships.as_ref(),
        principal.id,
        query.followed_userid.as_deref(),
    )
    .await?;

    Ok(Json(ApiResponse::message("Unfollowed successfully")))
}
