//! Session token issuing and verification
//!
//! Tokens are HS256 JWTs signed with a process-wide secret. The payload is
//! the principal's public claims plus `iat`/`exp`; nothing is stored server
//! side, so a token stays valid until it expires.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::models::Principal;

/// Seven days
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 604_800;

/// Ten years
pub const MAX_TOKEN_TTL_SECONDS: u64 = 315_360_000;

/// Token service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// HMAC secret used to sign and verify tokens
    pub secret_key: String,
    /// Token lifetime in seconds (default: 7 days)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECONDS
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub principal: Principal,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

#[derive(Error, Debug)]
pub enum TokenError {
    /// Bad signature, malformed payload or structural corruption
    #[error("invalid session token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("session token expired")]
    Expired,

    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token service misconfigured: {0}")]
    Configuration(String),
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        if config.secret_key.trim().is_empty() {
            return Err(TokenError::Configuration(
                "secret key must not be empty".to_string(),
            ));
        }
        if config.token_ttl_seconds == 0 {
            return Err(TokenError::Configuration(
                "token lifetime must be positive".to_string(),
            ));
        }
        if config.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(TokenError::Configuration(format!(
                "token lifetime must not exceed {MAX_TOKEN_TTL_SECONDS} seconds"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(TokenService {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            ttl_seconds: config.token_ttl_seconds,
        })
    }

    /// Issue a token for `principal`, valid from now
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, unix_now())
    }

    /// Issue a token as if it had been created at `issued_at` (unix seconds)
    pub fn issue_at(&self, principal: &Principal, issued_at: u64) -> Result<String, TokenError> {
        let exp = issued_at.checked_add(self.ttl_seconds).ok_or_else(|| {
            TokenError::Configuration("token expiry overflows the clock".to_string())
        })?;
        let claims = SessionClaims {
            principal: principal.clone(),
            iat: issued_at,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, returning the embedded principal
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            },
        )?;
        Ok(data.claims.principal)
    }

    /// Get the token lifetime in seconds
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

fn unix_now() -> u64 {
    // A clock before 1970 is treated as the epoch
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(TokenConfig {
            secret_key: secret.to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        })
        .unwrap()
    }

    fn principal() -> Principal {
        Principal {
            id: 42,
            username: "grace".into(),
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            profile_pic: Some("https://img.example.com/grace.png".into()),
            cover_pic: None,
            city: Some("Arlington".into()),
            website: None,
        }
    }

    #[test]
    fn issued_token_verifies_to_same_principal() {
        let tokens = service("test-secret");
        let token = tokens.issue(&principal()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), principal());
    }

    #[test]
    fn token_older_than_ttl_is_expired() {
        let tokens = service("test-secret");
        let issued_at = unix_now() - DEFAULT_TOKEN_TTL_SECONDS - 60;
        let token = tokens.issue_at(&principal(), issued_at).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_just_inside_ttl_is_accepted() {
        let tokens = service("test-secret");
        let issued_at = unix_now() - DEFAULT_TOKEN_TTL_SECONDS + 120;
        let token = tokens.issue_at(&principal(), issued_at).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn token_signed_with_another_secret_is_invalid() {
        let token = service("secret-a").issue(&principal()).unwrap();
        assert!(matches!(
            service("secret-b").verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let tokens = service("test-secret");
        let token = tokens.issue(&principal()).unwrap();
        let mut other = principal();
        other.id = 1;
        let other_token = tokens.issue(&other).unwrap();

        // Payload swapped in, signature kept from the original token
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = other_token.split('.').nth(1).unwrap();
        let forged = parts.join(".");

        assert!(matches!(tokens.verify(&forged), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = service("test-secret");
        assert!(matches!(tokens.verify("not-a-token"), Err(TokenError::Invalid(_))));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn claims_never_include_a_password() {
        let claims = SessionClaims {
            principal: principal(),
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["id"], 42);
        assert_eq!(json["exp"], 2);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let result = TokenService::new(TokenConfig {
            secret_key: "  ".into(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        });
        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        let result = TokenService::new(TokenConfig {
            secret_key: "test-secret".into(),
            token_ttl_seconds: u64::MAX,
        });
        assert!(matches!(result, Err(TokenError::Configuration(_))));

        let longest = TokenService::new(TokenConfig {
            secret_key: "test-secret".into(),
            token_ttl_seconds: MAX_TOKEN_TTL_SECONDS,
        })
        .unwrap();
        let token = longest.issue(&principal()).unwrap();
        assert!(longest.verify(&token).is_ok());
    }

    #[test]
    fn expiry_past_the_clock_is_an_error() {
        let tokens = service("test-secret");
        assert!(matches!(
            tokens.issue_at(&principal(), u64::MAX - 1),
            Err(TokenError::Configuration(_))
        ));
    }
}
