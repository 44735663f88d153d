//! Admin Settings Repository
//!
//! Bank / QR payment details live in a single upserted row (id 1).

use super::RepoResult;
use shared::models::{AdminSettings, PaymentDetailsUpdate};
use sqlx::SqlitePool;

const SETTINGS_SELECT: &str = "SELECT qr_code_image, bank_name, account_holder_name, account_number, ifsc_code, upi_id FROM admin_settings WHERE id = 1";

/// Current settings; defaults (all empty) when nothing was saved yet.
pub async fn get(pool: &SqlitePool) -> RepoResult<AdminSettings> {
    let row = sqlx::query_as::<_, AdminSettings>(SETTINGS_SELECT)
        .fetch_optional(pool)
        .await?;
    Ok(row.unwrap_or_default())
}

/// Replace the bank details (the QR image is kept as-is).
pub async fn update_payment_details(
    pool: &SqlitePool,
    details: &PaymentDetailsUpdate,
) -> RepoResult<AdminSettings> {
    sqlx::query(
        "INSERT INTO admin_settings (id, bank_name, account_holder_name, account_number, ifsc_code, upi_id) VALUES (1, ?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            bank_name = excluded.bank_name,
            account_holder_name = excluded.account_holder_name,
            account_number = excluded.account_number,
            ifsc_code = excluded.ifsc_code,
            upi_id = excluded.upi_id",
    )
    .bind(&details.bank_name)
    .bind(&details.account_holder_name)
    .bind(&details.account_number)
    .bind(&details.ifsc_code)
    .bind(&details.upi_id)
    .execute(pool)
    .await?;
    get(pool).await
}

/// Store the uploaded QR image reference (bank details are kept as-is).
pub async fn set_qr_image(pool: &SqlitePool, path: &str) -> RepoResult<AdminSettings> {
    sqlx::query(
        "INSERT INTO admin_settings (id, qr_code_image) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET qr_code_image = excluded.qr_code_image",
    )
    .bind(path)
    .execute(pool)
    .await?;
    get(pool).await
}
