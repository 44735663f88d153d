//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role gates.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;

/// Whether a request may pass without a bearer token.
///
/// Public surface: login endpoints, the self-service application, the public
/// member directory/stats, the public settings view, and static uploads.
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if !path.starts_with("/api/") {
        // /health, /uploads/... and anything else non-API 404s on its own
        return true;
    }
    matches!(
        (method.as_str(), path),
        ("POST", "/api/auth/login")
            | ("POST", "/api/admin/login")
            | ("POST", "/api/members/apply")
            | ("GET", "/api/members/public")
            | ("GET", "/api/members/stats")
            | ("GET", "/api/settings")
    )
}

/// Authentication middleware.
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>` and
/// injects [`CurrentUser`] into the request extensions. OPTIONS requests
/// (CORS preflight) and public routes pass through untouched.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or_else(AppError::invalid_token)?
        }
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "Missing authorization header");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %req.uri(), "Token validation failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token()),
            }
        }
    }
}

/// Admin gate: requires `role == "admin"`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;
    if !user.is_admin() {
        tracing::warn!(
            target: "security",
            user_id = %user.id,
            role = %user.role,
            "Admin-only route refused"
        );
        return Err(AppError::forbidden("Admin only"));
    }
    Ok(next.run(req).await)
}

/// Member gate: requires `role == "member"`.
pub async fn require_member(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;
    if !user.is_member() {
        tracing::warn!(
            target: "security",
            user_id = %user.id,
            role = %user.role,
            "Member-only route refused"
        );
        return Err(AppError::forbidden("Member only"));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_table() {
        let get = http::Method::GET;
        let post = http::Method::POST;

        assert!(is_public_route(&post, "/api/auth/login"));
        assert!(is_public_route(&post, "/api/members/apply"));
        assert!(is_public_route(&get, "/api/settings"));
        assert!(is_public_route(&get, "/health"));
        assert!(is_public_route(&get, "/uploads/qr/x.png"));

        assert!(!is_public_route(&get, "/api/members"));
        assert!(!is_public_route(&post, "/api/settings"));
        assert!(!is_public_route(&get, "/api/payments/mine"));
    }
}
