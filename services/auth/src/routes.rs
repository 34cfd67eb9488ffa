//! Authentication routes mounted under `/api/auth`

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use common::{
    error::{ApiError, DatabaseError},
    extract::JsonBody,
    response::ApiResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{error, info};

use crate::{
    AuthState,
    middleware::{cleared_session_cookie, session_cookie, session_middleware},
    models::{NewUser, Principal, User},
    validation::{normalize_email, validate_email, validate_password, validate_username},
};

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Response for user registration
#[derive(Serialize)]
pub struct RegisteredUser {
    pub userid: i64,
}

/// Create the router for the authentication endpoints
pub fn create_router(state: AuthState) -> Router {
    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .merge(protected_routes)
        .with_state(state)
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// User login endpoint
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (
        required(payload.username),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::InvalidParameter(
            "All fields are required".to_string(),
        ));
    };

    info!("Login attempt for user: {}", username);

    let Some(user) = state.users.find_by_username(username.trim()).await? else {
        verify_against_dummy(&password);
        return Err(invalid_credentials());
    };

    if !verify_password(&user, &password)? {
        return Err(invalid_credentials());
    }

    let token = state.tokens.issue(&user.principal()).map_err(|e| {
        error!("Failed to issue session token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::OK,
        jar.add(session_cookie(token)),
        Json(ApiResponse::message("User logged in successfully")),
    ))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AuthState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(email), Some(password), Some(name)) = (
        required(payload.username),
        required(payload.email),
        payload.password.filter(|p| !p.is_empty()),
        required(payload.name),
    ) else {
        return Err(ApiError::InvalidParameter(
            "All fields are required".to_string(),
        ));
    };

    let username = username.trim().to_string();
    let email = normalize_email(&email);

    validate_username(&username).map_err(ApiError::InvalidParameter)?;
    validate_email(&email).map_err(ApiError::InvalidParameter)?;
    validate_password(&password).map_err(ApiError::InvalidParameter)?;

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(ApiError::Conflict("Username is already taken".to_string()));
    }
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;

    let user = state
        .users
        .insert(&NewUser {
            username,
            email,
            password_hash,
            name: name.trim().to_string(),
        })
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration
            DatabaseError::UniqueViolation(_) => {
                ApiError::Conflict("Username or email is already taken".to_string())
            }
            other => ApiError::from(other),
        })?;

    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data(
            "User registered successfully",
            RegisteredUser { userid: user.id },
        )),
    ))
}

/// Logout endpoint
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::OK,
        jar.remove(cleared_session_cookie()),
        Json(ApiResponse::message("Logged out successfully")),
    )
}

/// Session check endpoint.
///
/// Unlike other protected routes this re-reads the user row, so a deleted
/// account is reported even while its token is still valid.
pub async fn me(
    State(state): State<AuthState>,
    principal: Principal,
) -> Result<Json<ApiResponse<Principal>>, ApiError> {
    let user = state
        .users
        .find_by_id(principal.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::with_data(
        "User is authenticated",
        user.principal(),
    )))
}

fn invalid_credentials() -> ApiError {
    ApiError::InvalidParameter("Invalid credentials".to_string())
}

/// Hash a password with a fresh salt
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })
}

fn verify_password(user: &User, password: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!("Stored password hash for user {} is unreadable: {}", user.id, e);
        ApiError::InternalServerError
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Argon2 hash no account owns, verified on the unknown-user login path
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Run one argon2 verification that always fails, so an unknown username
/// costs the same as a wrong password
fn verify_against_dummy(password: &str) -> bool {
    let hash = DUMMY_HASH.get_or_init(|| hash_password("no account owns this").unwrap_or_default());
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
