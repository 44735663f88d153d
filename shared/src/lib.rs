//! Shared types for the membership portal
//!
//! Data models and small utilities used by the server crate (and by API
//! clients that want typed payloads). DB row types are feature-gated behind
//! `db` so frontends can depend on this crate without pulling in sqlx.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
