//! Membership Plan API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::plan_index;
use crate::db::repository::plan;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text};
use shared::models::{MembershipPlan, PlanCreate, PlanUpdate};

/// GET /api/plans - list plans, newest first (blank names surfaced as
/// `Plan <price>`)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MembershipPlan>>> {
    plan_index::ensure_plan_indexes(&state.pool, &state.plan_index, false).await?;

    let plans = plan::find_all(&state.pool)
        .await?
        .into_iter()
        .map(|p| {
            let name = p.display_name();
            MembershipPlan { name, ..p }
        })
        .collect();
    Ok(Json(plans))
}

/// POST /api/plans - create a plan (repairs legacy unique indexes on
/// conflict, then retries once)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PlanCreate>,
) -> AppResult<Json<MembershipPlan>> {
    let created = plan::create(&state.pool, &state.plan_index, payload).await?;

    tracing::info!(
        plan_id = created.id,
        name = %created.name,
        price = created.price,
        operator = %user.id,
        "Membership plan created"
    );

    Ok(Json(created))
}

/// PUT /api/plans/:id - update name/price
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PlanUpdate>,
) -> AppResult<Json<MembershipPlan>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;

    let updated = plan::update(&state.pool, id, payload).await?;

    tracing::info!(plan_id = id, operator = %user.id, "Membership plan updated");

    Ok(Json(updated))
}

/// DELETE /api/plans/:id - delete a plan (existing member snapshots keep
/// their recorded fee)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = plan::delete(&state.pool, id).await?;
    if !removed {
        return Err(crate::utils::AppError::not_found(format!("Plan {id}")));
    }

    tracing::info!(plan_id = id, operator = %user.id, "Membership plan deleted");

    Ok(Json(true))
}
