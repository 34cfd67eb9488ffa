//! Error types shared by every service
//!
//! `DatabaseError` is what store adapters return. `ApiError` is the
//! client-facing taxonomy every handler converts into; it renders the
//! `{"status", "message"}` JSON body and never carries internal detail
//! for server-side failures.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error;
use tracing::{debug, error};

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint rejected the write
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error returned by a query.
    ///
    /// Constraint violations are split out so callers can map them to
    /// `Conflict` / `NotFound` instead of a generic server error.
    pub fn from_query(err: SqlxError) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKeyViolation(constraint);
            }
        }
        DatabaseError::Query(err)
    }
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        DatabaseError::from_query(err)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Client-facing error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing client input
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No usable credential was presented
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// A credential was presented but rejected
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Target resource is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate edge, username or email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request did not complete within the server's time limit
    #[error("Request timed out")]
    RequestTimeout,

    /// Downstream datastore failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::StoreUnavailable(_) | ApiError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::InvalidParameter(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::StoreUnavailable(err) => {
                error!("Store failure: {}", err);
                "Internal server error".to_string()
            }
            ApiError::RequestTimeout => "Request timed out".to_string(),
            ApiError::InternalServerError => "Internal server error".to_string(),
        };

        let classification = if status.is_client_error() {
            "failure"
        } else {
            "error"
        };

        let body = Json(json!({
            "status": classification,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Request body must be sent as application/json"
            }
            JsonRejection::JsonDataError(_) => "Request body has missing or mistyped fields",
            _ => "Request body is not valid JSON",
        };
        ApiError::InvalidParameter(message.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query string: {}", rejection.body_text());
        ApiError::InvalidParameter("Invalid query parameters".to_string())
    }
}
