//! Authentication Handlers
//!
//! Member login against the account store and caller introspection.
//! Administrator login is separate (see `api::admin`): admin credentials
//! are out-of-band configuration, not stored accounts.

use axum::{Json, extract::{Extension, State}};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::account;
use crate::utils::{AppError, AppResult};
use shared::models::ROLE_ADMIN;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with JWT token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

/// Caller info returned by /me
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// POST /api/auth/login - member login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let account = account::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let password_valid = account
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&account.id.to_string(), &account.email, &account.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        account_id = account.id,
        email = %account.email,
        "Member logged in"
    );

    Ok(Json(LoginResponse {
        token,
        role: account.role,
    }))
}

/// GET /api/auth/me - current caller info
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    if user.is_admin() {
        return Ok(Json(UserInfo {
            id: user.id,
            name: "Administrator".to_string(),
            email: user.email,
            role: ROLE_ADMIN.to_string(),
        }));
    }

    let account_id = user
        .account_id()
        .ok_or_else(|| AppError::not_found("Account".to_string()))?;
    let account = account::find_by_id(&state.pool, account_id)
        .await?
        .ok_or_else(|| AppError::not_found("Account".to_string()))?;

    Ok(Json(UserInfo {
        id: account.id.to_string(),
        name: account.name,
        email: account.email,
        role: account.role,
    }))
}
