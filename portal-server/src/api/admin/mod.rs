//! Admin API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new().route("/login", post(handler::login));

    let admin_routes = Router::new()
        .route("/dashboard", get(handler::dashboard))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(admin_routes)
}
