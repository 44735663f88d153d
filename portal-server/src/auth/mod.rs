//! Authentication Module
//!
//! JWT bearer-token authentication and role gates.

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_member};
