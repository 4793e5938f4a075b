use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::TokenPair;
use crate::state::AppState;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub jti: String,
    pub exp: i64,
    pub token_type: String,
}

/// Issue an access/refresh pair for a freshly authenticated user.
pub fn issue_pair(user_id: &str, username: &str, config: &Config) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access: issue_access(user_id, username, config)?,
        refresh: issue_token(
            user_id,
            username,
            TOKEN_TYPE_REFRESH,
            Duration::days(config.refresh_ttl_days),
            config,
        )?,
    })
}

pub fn issue_access(user_id: &str, username: &str, config: &Config) -> Result<String, AppError> {
    issue_token(
        user_id,
        username,
        TOKEN_TYPE_ACCESS,
        Duration::minutes(config.access_ttl_minutes),
        config,
    )
}

fn issue_token(
    user_id: &str,
    username: &str,
    token_type: &str,
    ttl: Duration,
    config: &Config,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: (Utc::now() + ttl).timestamp(),
        token_type: token_type.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// Decode and verify a token. Signature and expiry are checked; the caller
/// is responsible for checking `token_type` and the blacklist.
pub fn decode_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
/// Only access tokens are accepted here; a refresh token is a 401.
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = decode_token(token, &state.config).map_err(|_| AppError::Unauthorized)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}
