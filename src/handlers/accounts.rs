use axum::{extract::State, http::StatusCode, Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde_json::{json, Value};

use crate::auth::{self, AuthUser, TOKEN_TYPE_REFRESH};
use crate::error::AppError;
use crate::models::{LogoutRequest, RefreshRequest, RegisterRequest, TokenPair, TokenRequest};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }

    let password_hash =
        hash(&req.password, DEFAULT_COST).map_err(|e| AppError::Internal(e.to_string()))?;
    let user = state.pool.create_user(username, &password_hash).await?;

    tracing::info!("registered user {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

/// Issue an access/refresh pair for valid credentials.
pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let user = state
        .pool
        .find_user(req.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let ok = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !ok {
        return Err(AppError::InvalidCredentials);
    }

    let pair = auth::issue_pair(&user.id, &user.username, &state.config)?;
    Ok(Json(pair))
}

/// Exchange a live refresh token for a fresh access token. Blacklisted,
/// expired, or wrong-type tokens are rejected.
pub async fn token_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    let claims =
        auth::decode_token(&req.refresh, &state.config).map_err(|_| AppError::Unauthorized)?;
    if claims.token_type != TOKEN_TYPE_REFRESH {
        return Err(AppError::Unauthorized);
    }
    if state.pool.is_token_revoked(&claims.jti).await? {
        return Err(AppError::Unauthorized);
    }

    let access = auth::issue_access(&claims.sub, &claims.username, &state.config)?;
    Ok(Json(json!({ "access": access })))
}

/// Blacklist the caller's refresh token. Every failure mode (malformed,
/// expired, wrong type, already blacklisted) collapses into the same
/// generic invalid-token response.
pub async fn logout(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<Value>, AppError> {
    let claims =
        auth::decode_token(&req.refresh_token, &state.config).map_err(|_| AppError::InvalidToken)?;
    if claims.token_type != TOKEN_TYPE_REFRESH {
        return Err(AppError::InvalidToken);
    }

    let revoked = state.pool.revoke_token(&claims.jti).await?;
    if !revoked {
        return Err(AppError::InvalidToken);
    }

    Ok(Json(json!({ "message": "Logout successful" })))
}
