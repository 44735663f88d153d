//! Payments API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{require_admin, require_member};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    // Member: submit proof-of-payment, see own submissions
    let member_routes = Router::new()
        .route("/", post(handler::submit))
        .route("/mine", get(handler::list_mine))
        .layer(middleware::from_fn(require_member));

    // Admin: review queue
    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    member_routes.merge(admin_routes)
}
