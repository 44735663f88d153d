//! Settings API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    // Public settings view for the registration / donation pages
    let public_routes = Router::new().route("/", get(handler::get_settings));

    // Bank details and QR image are admin-managed
    let admin_routes = Router::new()
        .route("/payment-details", put(handler::update_payment_details))
        .route("/qr", post(handler::upload_qr))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(admin_routes)
}
