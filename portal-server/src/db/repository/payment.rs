//! Donation Payment Repository

use super::{RepoError, RepoResult};
use shared::models::{Page, Payment, PaymentWithAccount, STATUS_PENDING, is_valid_category, is_valid_status};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const PAYMENT_SELECT: &str =
    "SELECT id, account_id, category, amount, screenshot, status, created_at FROM payment";

// Review list joins the submitter; accounts removed by a member delete
// leave the payment row with blank submitter columns.
const PAYMENT_WITH_ACCOUNT_SELECT: &str = "SELECT p.id, p.account_id, p.category, p.amount, p.screenshot, p.status, p.created_at, COALESCE(a.name, '') as account_name, COALESCE(a.email, '') as account_email, COALESCE(a.phone, '') as account_phone FROM payment p LEFT JOIN account a ON p.account_id = a.id";

/// Record a submitted proof-of-payment (status starts pending).
pub async fn create(
    pool: &SqlitePool,
    account_id: i64,
    category: &str,
    amount: f64,
    screenshot: &str,
) -> RepoResult<Payment> {
    if !is_valid_category(category) {
        return Err(RepoError::Validation(format!(
            "Unknown donation category: {category}"
        )));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(RepoError::Validation(
            "amount must be a non-negative number".into(),
        ));
    }
    if screenshot.trim().is_empty() {
        return Err(RepoError::Validation("Payment screenshot is required".into()));
    }

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO payment (id, account_id, category, amount, screenshot, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(account_id)
    .bind(category)
    .bind(amount)
    .bind(screenshot)
    .bind(STATUS_PENDING)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payment".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// A member's own submissions, newest first.
pub async fn find_by_account(pool: &SqlitePool, account_id: i64) -> RepoResult<Vec<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE account_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(account_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Admin review list: optional status filter, submitter join, paginated.
pub async fn list(
    pool: &SqlitePool,
    status: Option<&str>,
    page: i64,
    limit: i64,
) -> RepoResult<Page<PaymentWithAccount>> {
    let page = page.max(1);
    let limit = limit.max(1);

    let status = status.filter(|s| !s.is_empty());
    let (where_sql, count_where) = match status {
        Some(_) => (" WHERE p.status = ?", " WHERE status = ?"),
        None => ("", ""),
    };

    let sql =
        format!("{PAYMENT_WITH_ACCOUNT_SELECT}{where_sql} ORDER BY p.created_at DESC LIMIT ? OFFSET ?");
    let mut query = sqlx::query_as::<_, PaymentWithAccount>(&sql);
    if let Some(status) = status {
        query = query.bind(status);
    }
    let items = query
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM payment{count_where}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = status {
        count_query = count_query.bind(status);
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(Page {
        items,
        total,
        page,
        limit,
    })
}

/// Admin review decision. Statuses share the member vocabulary and are just
/// as permissive.
pub async fn update_status(pool: &SqlitePool, id: i64, status: &str) -> RepoResult<Payment> {
    if !is_valid_status(status) {
        return Err(RepoError::Validation(format!("Invalid status: {status}")));
    }
    let rows = sqlx::query("UPDATE payment SET status = ?1 WHERE id = ?2")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Payment {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}

pub async fn count_pending(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment WHERE status = ?")
        .bind(STATUS_PENDING)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
