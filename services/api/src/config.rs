//! Application configuration
//!
//! Sources, lowest precedence first: built-in defaults, `SOCIAL_*`
//! variables (`SOCIAL_SERVER__PORT=8080`), then the plain deployment
//! variables `DATABASE_URL`, `SECRET_KEY`, `PORT` and `FRONTEND_URL`.

use auth::jwt::{DEFAULT_TOKEN_TTL_SECONDS, TokenConfig};
use common::database::DatabaseConfig;
use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::env;

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to send credentialed requests
    pub cors_origins: Vec<String>,
    /// Deployed frontend origin, appended to `cors_origins`
    pub frontend_url: Option<String>,
    pub request_timeout_seconds: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configured origins plus the frontend URL, without duplicates
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = Vec::new();
        let candidates = self.cors_origins.iter().chain(self.frontend_url.iter());
        for origin in candidates {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: TokenConfig,
}

impl AppConfig {
    /// Load the configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 10000)?
            .set_default("server.cors_origins", vec!["http://localhost:5173"])?
            .set_default("server.request_timeout_seconds", 30)?
            .set_default("auth.token_ttl_seconds", DEFAULT_TOKEN_TTL_SECONDS)?
            .add_source(
                Environment::with_prefix("SOCIAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.secret_key", env::var("SECRET_KEY").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("server.frontend_url", env::var("FRONTEND_URL").ok())?
            .build()?
            .try_deserialize()
    }
}
