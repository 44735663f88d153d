//! Payment API Handlers
//!
//! Donation proof-of-payment submission (screenshot upload) and the admin
//! review queue. Screenshots are reviewed manually; there is no gateway.

use axum::{
    Json,
    extract::{Extension, Multipart, Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::payment;
use crate::utils::upload::{self, UploadKind};
use crate::utils::{AppError, AppResult};
use shared::models::{DEFAULT_CATEGORY, Page, Payment, PaymentWithAccount};

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

/// POST /api/payments - submit a proof-of-payment (multipart: amount,
/// category, screenshot)
pub async fn submit(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Json<Payment>> {
    let account_id = user.account_id().ok_or_else(AppError::unauthorized)?;

    let form = upload::collect_form(multipart).await?;

    let amount = match form.get("amount") {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::validation("amount must be a number"))?,
        _ => 0.0,
    };
    let category = form.get("category").unwrap_or(DEFAULT_CATEGORY).to_string();

    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::validation("Payment screenshot is required"))?;
    let screenshot = upload::save_image(&state.work_dir(), UploadKind::Payment, file)?;

    let created = payment::create(&state.pool, account_id, &category, amount, &screenshot).await?;

    tracing::info!(
        payment_id = created.id,
        account_id,
        category = %created.category,
        amount = created.amount,
        "Payment submitted"
    );

    Ok(Json(created))
}

/// GET /api/payments/mine - the calling member's submissions
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Payment>>> {
    let account_id = user.account_id().ok_or_else(AppError::unauthorized)?;
    let payments = payment::find_by_account(&state.pool, account_id).await?;
    Ok(Json(payments))
}

/// GET /api/payments - admin review queue (status filter + pagination)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<PaymentWithAccount>>> {
    let page = payment::list(
        &state.pool,
        query.status.as_deref(),
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )
    .await?;
    Ok(Json(page))
}

/// PATCH /api/payments/:id/status - approve / reject a submission
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<Payment>> {
    let updated = payment::update_status(&state.pool, id, &payload.status).await?;

    tracing::info!(
        payment_id = id,
        status = %updated.status,
        operator = %user.id,
        "Payment status changed"
    );

    Ok(Json(updated))
}
