//! Settings API Handlers
//!
//! The public settings view combines the plan options with the configured
//! bank / QR payment details; admin endpoints maintain the latter.

use axum::{
    Json,
    extract::{Extension, Multipart, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::plan_index;
use crate::db::repository::{plan, settings};
use crate::utils::upload::{self, UploadKind};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{PaymentDetailsUpdate, PlanOption, SettingsView};

async fn build_view(state: &ServerState) -> AppResult<SettingsView> {
    let plans = plan::find_all(&state.pool).await?;
    let stored = settings::get(&state.pool).await?;

    let membership_options: Vec<PlanOption> = plans
        .iter()
        .map(|p| PlanOption {
            id: p.id,
            name: p.display_name(),
            price: p.price,
        })
        .collect();
    // Newest plan doubles as the advertised default price
    let default_price = membership_options.first().map(|p| p.price).unwrap_or(0.0);

    Ok(SettingsView {
        lifetime_price: default_price,
        one_time_price: default_price,
        membership_options,
        payment_qr_image: stored.qr_code_image,
        bank_name: stored.bank_name,
        account_holder_name: stored.account_holder_name,
        account_number: stored.account_number,
        ifsc_code: stored.ifsc_code,
        upi_id: stored.upi_id,
    })
}

/// GET /api/settings - public settings view
pub async fn get_settings(State(state): State<ServerState>) -> AppResult<Json<SettingsView>> {
    plan_index::ensure_plan_indexes(&state.pool, &state.plan_index, false).await?;
    Ok(Json(build_view(&state).await?))
}

/// PUT /api/settings/payment-details - replace bank details
pub async fn update_payment_details(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PaymentDetailsUpdate>,
) -> AppResult<Json<SettingsView>> {
    for (value, field) in [
        (&payload.bank_name, "bank_name"),
        (&payload.account_holder_name, "account_holder_name"),
    ] {
        if !value.is_empty() {
            validate_required_text(value, field, MAX_NAME_LEN)?;
        }
    }
    for (value, field) in [
        (&payload.account_number, "account_number"),
        (&payload.ifsc_code, "ifsc_code"),
        (&payload.upi_id, "upi_id"),
    ] {
        if value.len() > MAX_SHORT_TEXT_LEN {
            return Err(AppError::validation(format!("{field} is too long")));
        }
    }

    settings::update_payment_details(&state.pool, &payload).await?;

    tracing::info!(operator = %user.id, "Payment details updated");

    Ok(Json(build_view(&state).await?))
}

/// POST /api/settings/qr - upload the payment QR image
pub async fn upload_qr(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Json<SettingsView>> {
    let form = upload::collect_form(multipart).await?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::validation("QR image required"))?;

    let path = upload::save_image(&state.work_dir(), UploadKind::Qr, file)?;
    settings::set_qr_image(&state.pool, &path).await?;

    tracing::info!(operator = %user.id, qr = %path, "Payment QR updated");

    Ok(Json(build_view(&state).await?))
}
