//! Account Repository
//!
//! The authenticatable login entity paired with a member record. Writes are
//! only reachable through the [`membership`](super::membership) coordinator's
//! transactions; this module exposes the pool-level reads used by login and
//! profile handlers plus the transaction-scoped helpers.

use super::{RepoError, RepoResult};
use shared::models::{Account, AccountMirror, ROLE_MEMBER};
use shared::util::{normalize_email, now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const ACCOUNT_SELECT: &str = "SELECT id, email, password_hash, name, phone, address, membership_type, membership_status, role, created_at FROM account";

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Account>> {
    let sql = format!("{ACCOUNT_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, Account>(&sql)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Account>> {
    let sql = format!("{ACCOUNT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Account>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

// ── Transaction-scoped helpers (membership coordinator) ──────

pub(crate) async fn find_by_email_with(
    conn: &mut SqliteConnection,
    email: &str,
) -> RepoResult<Option<Account>> {
    let sql = format!("{ACCOUNT_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, Account>(&sql)
        .bind(normalize_email(email))
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Insert a member-role account. The password is hashed here; plaintext
/// never reaches the table.
pub(crate) async fn insert_with(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    mirror: &AccountMirror,
) -> RepoResult<i64> {
    let password_hash = Account::hash_password(password)
        .map_err(|e| RepoError::Database(format!("Password hashing failed: {e}")))?;
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO account (id, email, password_hash, name, phone, address, membership_type, membership_status, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(id)
    .bind(normalize_email(email))
    .bind(password_hash)
    .bind(&mirror.name)
    .bind(&mirror.phone)
    .bind(&mirror.address)
    .bind(&mirror.membership_type)
    .bind(&mirror.membership_status)
    .bind(ROLE_MEMBER)
    .bind(now_millis())
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Propagate denormalized member fields to the paired account.
///
/// Prefers the explicit account reference; falls back to the normalized
/// email for legacy rows. No matching account is a no-op, not an error.
/// The password hash is never touched here.
pub(crate) async fn update_mirror_with(
    conn: &mut SqliteConnection,
    account_id: Option<i64>,
    email: &str,
    mirror: &AccountMirror,
) -> RepoResult<()> {
    let set_clause = "SET name = ?1, phone = ?2, address = ?3, membership_type = ?4, membership_status = ?5";
    let rows = if let Some(account_id) = account_id {
        sqlx::query(&format!("UPDATE account {set_clause} WHERE id = ?6"))
            .bind(&mirror.name)
            .bind(&mirror.phone)
            .bind(&mirror.address)
            .bind(&mirror.membership_type)
            .bind(&mirror.membership_status)
            .bind(account_id)
            .execute(&mut *conn)
            .await?
    } else {
        sqlx::query(&format!("UPDATE account {set_clause} WHERE email = ?6"))
            .bind(&mirror.name)
            .bind(&mirror.phone)
            .bind(&mirror.address)
            .bind(&mirror.membership_type)
            .bind(&mirror.membership_status)
            .bind(normalize_email(email))
            .execute(&mut *conn)
            .await?
    };

    if rows.rows_affected() == 0 {
        tracing::debug!(email = %email, "No paired account to mirror onto");
    }
    Ok(())
}

/// Delete the paired account. Best-effort: a missing account is fine.
pub(crate) async fn delete_with(
    conn: &mut SqliteConnection,
    account_id: Option<i64>,
    email: &str,
) -> RepoResult<bool> {
    let rows = if let Some(account_id) = account_id {
        sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(account_id)
            .execute(&mut *conn)
            .await?
    } else {
        sqlx::query("DELETE FROM account WHERE email = ?")
            .bind(normalize_email(email))
            .execute(&mut *conn)
            .await?
    };
    Ok(rows.rows_affected() > 0)
}
