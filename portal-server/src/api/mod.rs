//! API routing module
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`auth`] - member login and caller info
//! - [`admin`] - admin login and dashboard summary
//! - [`members`] - membership application and admin member management
//! - [`plans`] - membership pricing plans
//! - [`payments`] - donation payment submission and review
//! - [`settings`] - public settings view, bank/QR configuration
//! - [`files`] - stored upload serving

pub mod admin;
pub mod auth;
pub mod files;
pub mod health;
pub mod members;
pub mod payments;
pub mod plans;
pub mod settings;

use axum::{Router, middleware};

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Assemble the full application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(files::router())
        .merge(auth::router())
        .merge(admin::router())
        .merge(members::router())
        .merge(plans::router())
        .merge(payments::router())
        .merge(settings::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
