//! Session middleware for cookie-carried tokens
//!
//! Every protected route runs behind [`session_middleware`]. A request
//! without the `accessToken` cookie is rejected with 401; a token that fails
//! verification, whether forged or expired, is rejected with 403. On success
//! the decoded [`Principal`] is stored in the request extensions, where
//! handlers read it through the `Principal` extractor.
//!
//! The principal is trusted as signed; it is not re-checked against the
//! user store here. `GET /api/auth/me` is the one endpoint that re-fetches.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::error::ApiError;
use tracing::{debug, warn};

use crate::{
    jwt::{TokenError, TokenService},
    models::Principal,
};

/// Name of the cookie carrying the session token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Verify the session cookie and attach the principal
pub async fn session_middleware(
    State(tokens): State<TokenService>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Unauthenticated("User is not logged in".to_string()))?;

    let principal = tokens.verify(&token).map_err(|e| {
        match &e {
            TokenError::Expired => debug!("Rejected expired session token"),
            other => warn!("Rejected session token: {}", other),
        }
        ApiError::Forbidden("Invalid or expired token.".to_string())
    })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthenticated("Unauthorized. Please log in first.".into()))
    }
}

/// Cookie carrying a freshly issued token.
///
/// Not marked `Secure`, so it also travels over plain HTTP; deployments
/// behind TLS should harden this.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(false)
        .path("/")
        .build()
}

/// Removal cookie with the same attributes as [`session_cookie`]
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(false)
        .path("/")
        .build()
}
