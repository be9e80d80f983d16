//! Bearer JWT authentication.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tubely_models::UserId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Issuer of access tokens.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Decoded access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Signs and verifies HS256 access tokens.
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `user_id`, valid for `ttl`.
    pub fn issue(&self, user_id: &UserId, ttl: Duration) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> ApiResult<UserId> {
        let token_data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| ApiError::unauthorized(format!("Token validation failed: {}", e)))?;

        token_data
            .claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Token subject is not a user ID"))
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get Authorization header
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let user_id = state.jwt.verify(token)?;

        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let jwt = JwtVerifier::new("test-secret");
        let user_id = UserId::new();

        let token = jwt.issue(&user_id, Duration::from_secs(3600)).unwrap();
        assert_eq!(jwt.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtVerifier::new("secret-a")
            .issue(&UserId::new(), Duration::from_secs(3600))
            .unwrap();

        let err = JwtVerifier::new("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtVerifier::new("test-secret");
        let past = Utc::now().timestamp() - 3600;
        let claims = AccessClaims {
            sub: UserId::new().to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: past - 60,
            exp: past,
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding).unwrap();

        assert!(matches!(jwt.verify(&token), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let jwt = JwtVerifier::new("test-secret");
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: UserId::new().to_string(),
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding).unwrap();

        assert!(matches!(jwt.verify(&token), Err(ApiError::Unauthorized(_))));
    }
}
