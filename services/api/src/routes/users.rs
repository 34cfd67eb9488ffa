//! `/api/user` handlers

use auth::models::{Principal, ProfileUpdate};
use axum::{
    Json,
    extract::{Path, State},
};
use common::{error::ApiError, extract::JsonBody, response::ApiResponse};
use tracing::info;

use crate::{params::parse_id, state::AppState};

/// Public profile of any user
pub async fn find_user(
    State(state): State<AppState>,
    Path(userid): Path<String>,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let id = parse_id(Some(userid.as_str()))
        .ok_or_else(|| ApiError::InvalidParameter("Invalid or missing user ID".to_string()))?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::with_data(
        "User fetched successfully",
        user.principal(),
    )))
}

/// Update the caller's own profile.
///
/// The caller's session token keeps its old claims until the next login.
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(payload): JsonBody<ProfileUpdate>,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let update = payload.normalized();
    if update.is_empty() {
        return Err(ApiError::InvalidParameter(
            "No update fields provided.".to_string(),
        ));
    }

    let user = state
        .users
        .update_profile(principal.id, &update)
        .await?
        .ok_or_else(|| {
            ApiError::Forbidden("User not found or no permission to update.".to_string())
        })?;

    info!("User {} updated their profile", user.id);

    Ok(Json(ApiResponse::with_data(
        "User updated successfully.",
        user.principal(),
    )))
}
