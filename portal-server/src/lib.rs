//! Membership & Donation Portal Server
//!
//! Backend for a membership management and donation-payment tracking portal:
//! public membership applications, admin review and member management,
//! donation proof-of-payment submission and approval, pricing plans, and
//! bank/QR payment settings.
//!
//! # Module structure
//!
//! ```text
//! portal-server/src/
//! ├── core/          # configuration, state, HTTP server
//! ├── auth/          # JWT authentication, role gates
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # errors, logging, uploads, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Set up the process environment: .env file, logging.
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
