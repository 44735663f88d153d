//! Stored upload serving

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/uploads/{category}/{file}", get(handler::serve))
}
