//! Members API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{require_admin, require_member};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    // Public: self-service application, directory, stats
    let public_routes = Router::new()
        .route("/apply", post(handler::apply))
        .route("/public", get(handler::list_public))
        .route("/stats", get(handler::stats));

    // Member self-service profile
    let member_routes = Router::new()
        .route("/me", get(handler::my_profile))
        .layer(middleware::from_fn(require_member));

    // Admin member management
    let admin_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/export", get(handler::export_csv))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(member_routes).merge(admin_routes)
}
