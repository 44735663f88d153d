//! Legacy membership_plan index cleanup.
//!
//! Earlier schema versions put UNIQUE indexes on `membership_plan` (name
//! and/or price). Plans carry no uniqueness guarantee anymore, so any such
//! index left behind makes legitimate plan creation fail with a constraint
//! violation. This module detects and drops them: once at startup
//! (best-effort, non-fatal) and again, forced, when a plan insert hits a
//! unique violation (see `repository::plan::create`).
//!
//! The once-per-process check lives in [`PlanIndexState`] owned by the
//! server state and passed in explicitly, so tests can reset it.

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::{Row, SqlitePool};

use super::repository::{RepoError, RepoResult};

/// Per-process "already checked" flag for the legacy index repair.
#[derive(Debug, Default)]
pub struct PlanIndexState {
    checked: AtomicBool,
}

impl PlanIndexState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_checked(&self) -> bool {
        self.checked.load(Ordering::Acquire)
    }

    fn mark_checked(&self) {
        self.checked.store(true, Ordering::Release);
    }

    /// Forget the check, forcing the next `ensure_plan_indexes` to re-scan.
    pub fn reset(&self) {
        self.checked.store(false, Ordering::Release);
    }
}

/// Drop legacy unique indexes on `membership_plan` if any exist.
///
/// With `force = false` this is a no-op once the state says the scan ran.
/// Missing table (fresh database before migrations) is not an error.
pub async fn ensure_plan_indexes(
    pool: &SqlitePool,
    state: &PlanIndexState,
    force: bool,
) -> RepoResult<()> {
    if state.is_checked() && !force {
        return Ok(());
    }

    // origin 'c' = created via CREATE INDEX; only those can be dropped.
    // Implicit UNIQUE-constraint indexes (origin 'u') cannot exist here:
    // the current schema declares none on membership_plan.
    let rows = sqlx::query("PRAGMA index_list(membership_plan)")
        .fetch_all(pool)
        .await
        .map_err(|e| RepoError::Database(format!("Plan index scan failed: {e}")))?;

    for row in rows {
        let name: String = row
            .try_get("name")
            .map_err(|e| RepoError::Database(e.to_string()))?;
        let unique: i64 = row
            .try_get("unique")
            .map_err(|e| RepoError::Database(e.to_string()))?;
        let origin: String = row
            .try_get("origin")
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if unique == 1 && origin == "c" {
            sqlx::query(&format!("DROP INDEX IF EXISTS \"{name}\""))
                .execute(pool)
                .await
                .map_err(|e| {
                    RepoError::Database(format!("Failed to drop legacy index {name}: {e}"))
                })?;
            tracing::info!(index = %name, "Dropped legacy membership_plan unique index");
        }
    }

    state.mark_checked();
    Ok(())
}
