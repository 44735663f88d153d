//! Server state
//!
//! [`ServerState`] holds the shared service handles: configuration, the
//! SQLite pool, the JWT service and the plan-index repair state. It is
//! cheap to clone (Arc / pool handles) and is the axum router state.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::plan_index::PlanIndexState;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT token service
    pub jwt_service: Arc<JwtService>,
    /// Once-per-process legacy plan-index repair state
    pub plan_index: Arc<PlanIndexState>,
}

impl ServerState {
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        plan_index: Arc<PlanIndexState>,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            plan_index,
        }
    }

    /// Initialize the server state:
    /// 1. work directory layout (database + uploads)
    /// 2. database pool, migrations, legacy index cleanup
    /// 3. JWT service
    pub async fn initialize(config: &Config) -> Result<Self, crate::AppError> {
        config.ensure_work_dir_structure().map_err(|e| {
            crate::AppError::internal(format!("Failed to create work directory structure: {e}"))
        })?;

        let plan_index = Arc::new(PlanIndexState::new());

        let db_path = config.database_dir().join("portal.db");
        let db_service = DbService::new(&db_path.to_string_lossy(), &plan_index).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        if config.admin_email.is_none() || config.admin_password.is_none() {
            tracing::warn!(
                "ADMIN_EMAIL / ADMIN_PASSWORD not configured; admin login is disabled"
            );
        }

        Ok(Self::new(
            config.clone(),
            db_service.pool,
            jwt_service,
            plan_index,
        ))
    }

    /// Working directory as a path.
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
