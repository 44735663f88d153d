//! Server configuration
//!
//! All settings come from environment variables with development defaults:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | ./data | Database + uploads root |
//! | HTTP_PORT | 5000 | HTTP API port |
//! | ENVIRONMENT | development | development / staging / production |
//! | CLIENT_ORIGIN | (any) | CORS allowed origin |
//! | ADMIN_EMAIL / ADMIN_PASSWORD | (unset) | Out-of-band administrator login |
//! | JWT_SECRET / JWT_EXPIRATION_MINUTES | see auth::jwt | Token signing |

use std::fs;
use std::path::PathBuf;

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and uploaded files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// CORS allowed origin (unset = any)
    pub client_origin: Option<String>,
    /// Administrator login email (out-of-band, not a stored account)
    pub admin_email: Option<String>,
    /// Administrator login password
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, defaults otherwise.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            client_origin: std::env::var("CLIENT_ORIGIN").ok(),
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Directory of the SQLite database file.
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Root of the uploaded-files tree.
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// Create the work directory layout (database + upload subdirectories).
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.database_dir())?;
        for subdir in ["profiles", "qr", "payments"] {
            fs::create_dir_all(self.uploads_dir().join(subdir))?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
