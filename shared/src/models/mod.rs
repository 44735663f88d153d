//! Data models
//!
//! Shared between portal-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod account;
pub mod member;
pub mod page;
pub mod payment;
pub mod plan;
pub mod settings;

// Re-exports
pub use account::*;
pub use member::*;
pub use page::*;
pub use payment::*;
pub use plan::*;
pub use settings::*;
