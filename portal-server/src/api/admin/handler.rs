//! Admin Handlers
//!
//! Administrator login (fixed out-of-band credentials from the environment,
//! never a stored account) and the dashboard summary.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::api::auth::LoginResponse;
use crate::core::ServerState;
use crate::db::repository::{member, payment};
use crate::utils::{AppError, AppResult};
use shared::models::{AdminSummary, ROLE_ADMIN};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/admin/login - administrator login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<AdminLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (Some(admin_email), Some(admin_password)) = (
        state.config.admin_email.as_deref(),
        state.config.admin_password.as_deref(),
    ) else {
        tracing::warn!(target: "security", "Admin login attempted but credentials are not configured");
        return Err(AppError::invalid_credentials());
    };

    if req.email != admin_email || req.password != admin_password {
        tracing::warn!(target: "security", email = %req.email, "Admin login rejected");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(admin_email, admin_email, ROLE_ADMIN)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!("Administrator logged in");

    Ok(Json(LoginResponse {
        token,
        role: ROLE_ADMIN.to_string(),
    }))
}

/// GET /api/admin/dashboard - summary counters
pub async fn dashboard(State(state): State<ServerState>) -> AppResult<Json<AdminSummary>> {
    let (total_members, lifetime_members, one_time_members, pending_membership_requests) =
        member::summary_counts(&state.pool).await?;
    let pending_payment_requests = payment::count_pending(&state.pool).await?;

    Ok(Json(AdminSummary {
        total_members,
        lifetime_members,
        one_time_members,
        pending_membership_requests,
        pending_payment_requests,
    }))
}
