//! Membership Plan Repository

use super::{RepoError, RepoResult};
use crate::db::plan_index::{self, PlanIndexState};
use shared::models::{MembershipPlan, PlanCreate, PlanUpdate, ResolvedPlan};
use sqlx::{SqliteConnection, SqlitePool};

/// Fallback plan label when no plan exists or a plan has a blank name.
pub const GENERIC_PLAN_NAME: &str = "Membership Plan";

const PLAN_SELECT: &str = "SELECT id, name, price, created_at FROM membership_plan";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MembershipPlan>> {
    let sql = format!("{PLAN_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, MembershipPlan>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MembershipPlan>> {
    let sql = format!("{PLAN_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MembershipPlan>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a plan.
///
/// A unique violation here can only come from a legacy index (current schema
/// declares none), so the repair runs once more, forced, and the insert is
/// retried a single time before the conflict is surfaced.
pub async fn create(
    pool: &SqlitePool,
    index_state: &PlanIndexState,
    data: PlanCreate,
) -> RepoResult<MembershipPlan> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(RepoError::Validation("Plan name is required".into()));
    }
    if !data.price.is_finite() || data.price < 0.0 {
        return Err(RepoError::Validation(
            "Plan price must be a non-negative number".into(),
        ));
    }

    plan_index::ensure_plan_indexes(pool, index_state, false).await?;

    match insert_plan(pool, &name, data.price).await {
        Err(RepoError::Duplicate(_)) => {
            plan_index::ensure_plan_indexes(pool, index_state, true).await?;
            match insert_plan(pool, &name, data.price).await {
                Err(RepoError::Duplicate(_)) => Err(RepoError::Duplicate(
                    "Duplicate unique index conflict on membership plans".into(),
                )),
                other => other,
            }
        }
        other => other,
    }
}

async fn insert_plan(pool: &SqlitePool, name: &str, price: f64) -> RepoResult<MembershipPlan> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO membership_plan (id, name, price, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(now)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create membership plan".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: PlanUpdate) -> RepoResult<MembershipPlan> {
    if let Some(price) = data.price
        && (!price.is_finite() || price < 0.0)
    {
        return Err(RepoError::Validation(
            "Plan price must be a non-negative number".into(),
        ));
    }
    let name = data.name.map(|n| n.trim().to_string());

    let rows = sqlx::query(
        "UPDATE membership_plan SET name = COALESCE(?1, name), price = COALESCE(?2, price) WHERE id = ?3",
    )
    .bind(name)
    .bind(data.price)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Plan {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Plan {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM membership_plan WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Resolve an optional plan reference into a fee/name snapshot.
///
/// A provided-and-found reference wins; otherwise the most recently created
/// plan is used (legacy fallback, see DESIGN.md); with no plans at all the
/// snapshot is fee 0 under the generic label, with no plan id.
pub async fn resolve_plan(pool: &SqlitePool, plan_ref: Option<i64>) -> RepoResult<ResolvedPlan> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;
    resolve_plan_with(&mut conn, plan_ref).await
}

/// Transaction-friendly variant of [`resolve_plan`]; the membership
/// coordinator calls this inside its write transaction so a re-snapshot can
/// never be torn apart from the member update it belongs to.
pub(crate) async fn resolve_plan_with(
    conn: &mut SqliteConnection,
    plan_ref: Option<i64>,
) -> RepoResult<ResolvedPlan> {
    let mut plan: Option<MembershipPlan> = None;

    if let Some(id) = plan_ref {
        let sql = format!("{PLAN_SELECT} WHERE id = ?");
        plan = sqlx::query_as::<_, MembershipPlan>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    }

    if plan.is_none() {
        let sql = format!("{PLAN_SELECT} ORDER BY created_at DESC LIMIT 1");
        plan = sqlx::query_as::<_, MembershipPlan>(&sql)
            .fetch_optional(&mut *conn)
            .await?;
    }

    Ok(match plan {
        Some(p) => {
            let plan_name = if p.name.trim().is_empty() {
                GENERIC_PLAN_NAME.to_string()
            } else {
                p.name.trim().to_string()
            };
            ResolvedPlan {
                fee: p.price,
                plan_name,
                plan_id: Some(p.id),
            }
        }
        None => ResolvedPlan {
            fee: 0.0,
            plan_name: GENERIC_PLAN_NAME.to_string(),
            plan_id: None,
        },
    })
}
