//! Membership workflow coordinator
//!
//! Every mutating membership operation pairs a member-record write with the
//! corresponding account write. Both run inside a single SQLite transaction;
//! if either side fails, nothing persists, so a member record can never
//! exist without the account state that was promised alongside it.
//!
//! The member ID allocation deliberately happens outside the transaction:
//! a sequence value, once read, is burned even when the rest of the request
//! fails, which keeps issued identifiers unique across deletions and
//! rollbacks.

use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult, account, counter, member, plan};
use shared::models::{
    Account, AccountMirror, Member, MemberApplication, MemberCreate, MemberUpdate, ResolvedPlan,
    STATUS_APPROVED, STATUS_PENDING, TYPE_ONE_TIME, is_valid_status,
};
use shared::util::{normalize_email, now_millis, snowflake_id};

/// Public membership application: member row plus (if absent) a paired
/// member-role account whose default password is the applicant's mobile
/// number (a documented weak default, replaced on first password change).
pub async fn apply(pool: &SqlitePool, input: MemberApplication) -> RepoResult<Member> {
    validate_profile(
        &input.full_name,
        &input.father_name,
        &input.mobile,
        &input.email,
        &input.address,
        &input.occupation,
        input.annual_income,
    )?;
    let email = normalize_email(&input.email);
    let member_id = counter::allocate_member_id(pool).await?;

    let mut tx = pool.begin().await?;

    let resolved = plan::resolve_plan_with(&mut tx, input.plan_id).await?;

    let account_id = match account::find_by_email_with(&mut tx, &email).await? {
        Some(existing) => existing.id,
        None => {
            let mirror = AccountMirror {
                name: input.full_name.clone(),
                phone: input.mobile.clone(),
                address: input.address.clone(),
                membership_type: TYPE_ONE_TIME.to_string(),
                membership_status: STATUS_PENDING.to_string(),
            };
            account::insert_with(&mut tx, &email, &input.mobile, &mirror).await?
        }
    };

    let id = insert_member(
        &mut tx,
        &member_id,
        &input,
        &email,
        &resolved,
        STATUS_PENDING,
        Some(account_id),
    )
    .await?;

    tx.commit().await?;

    member::find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

/// Admin member creation: status defaults to approved, the password may be
/// supplied, and an existing account for the email is a conflict; the
/// transaction rolls back and no member record persists.
pub async fn admin_create(
    pool: &SqlitePool,
    input: MemberCreate,
) -> RepoResult<(Member, Account)> {
    validate_profile(
        &input.full_name,
        &input.father_name,
        &input.mobile,
        &input.email,
        &input.address,
        &input.occupation,
        input.annual_income,
    )?;
    let status = match &input.status {
        Some(status) => {
            if !is_valid_status(status) {
                return Err(RepoError::Validation(format!("Invalid status: {status}")));
            }
            status.clone()
        }
        None => STATUS_APPROVED.to_string(),
    };
    let email = normalize_email(&input.email);
    let member_id = counter::allocate_member_id(pool).await?;

    let mut tx = pool.begin().await?;

    if account::find_by_email_with(&mut tx, &email).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "An account already exists for {email}"
        )));
    }

    let resolved = plan::resolve_plan_with(&mut tx, input.plan_id).await?;

    let mirror = AccountMirror {
        name: input.full_name.clone(),
        phone: input.mobile.clone(),
        address: input.address.clone(),
        membership_type: TYPE_ONE_TIME.to_string(),
        membership_status: status.clone(),
    };
    let password = input.password.as_deref().unwrap_or(&input.mobile);
    let account_id = account::insert_with(&mut tx, &email, password, &mirror).await?;

    let application = MemberApplication {
        full_name: input.full_name,
        father_name: input.father_name,
        mobile: input.mobile,
        email: email.clone(),
        address: input.address,
        occupation: input.occupation,
        annual_income: input.annual_income,
        plan_id: input.plan_id,
        profile_image: None,
    };
    let id = insert_member(
        &mut tx,
        &member_id,
        &application,
        &email,
        &resolved,
        &status,
        Some(account_id),
    )
    .await?;

    tx.commit().await?;

    let member = member::find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))?;
    let account = account::find_by_id(pool, account_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create account".into()))?;
    Ok((member, account))
}

/// Admin edit. A `plan_id` in the payload re-resolves the fee/name snapshot
/// inside the same transaction; denormalized mirrors propagate to the
/// paired account before commit.
pub async fn update(pool: &SqlitePool, id: i64, update: MemberUpdate) -> RepoResult<Member> {
    if let Some(status) = &update.status
        && !is_valid_status(status)
    {
        return Err(RepoError::Validation(format!("Invalid status: {status}")));
    }
    if let Some(income) = update.annual_income
        && (!income.is_finite() || income < 0.0)
    {
        return Err(RepoError::Validation(
            "annual_income must be a non-negative number".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    if member::find_by_id_with(&mut tx, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }

    let email = update.email.as_deref().map(normalize_email);
    sqlx::query(
        "UPDATE member SET
            full_name = COALESCE(?1, full_name),
            father_name = COALESCE(?2, father_name),
            mobile = COALESCE(?3, mobile),
            email = COALESCE(?4, email),
            address = COALESCE(?5, address),
            occupation = COALESCE(?6, occupation),
            annual_income = COALESCE(?7, annual_income),
            profile_image = COALESCE(?8, profile_image),
            status = COALESCE(?9, status),
            updated_at = ?10
        WHERE id = ?11",
    )
    .bind(&update.full_name)
    .bind(&update.father_name)
    .bind(&update.mobile)
    .bind(&email)
    .bind(&update.address)
    .bind(&update.occupation)
    .bind(update.annual_income)
    .bind(&update.profile_image)
    .bind(&update.status)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // A chosen plan re-snapshots fee/name/id atomically with the edit; the
    // resolver's fallback applies if the reference is dangling.
    if let Some(plan_id) = update.plan_id {
        let resolved = plan::resolve_plan_with(&mut tx, Some(plan_id)).await?;
        sqlx::query(
            "UPDATE member SET plan_id = ?1, plan_name = ?2, membership_fee = ?3, membership_type = ?4 WHERE id = ?5",
        )
        .bind(resolved.plan_id)
        .bind(&resolved.plan_name)
        .bind(resolved.fee)
        .bind(TYPE_ONE_TIME)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    let updated = member::find_by_id_with(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))?;

    propagate_mirror(&mut tx, &updated).await?;

    tx.commit().await?;
    Ok(updated)
}

/// Permissive status write: any recognized status at any time (approved
/// back to pending included), mirrored onto the paired account.
pub async fn set_status(pool: &SqlitePool, id: i64, status: &str) -> RepoResult<Member> {
    if !is_valid_status(status) {
        return Err(RepoError::Validation(format!("Invalid status: {status}")));
    }

    let mut tx = pool.begin().await?;

    let rows = sqlx::query("UPDATE member SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }

    let updated = member::find_by_id_with(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))?;

    propagate_mirror(&mut tx, &updated).await?;

    tx.commit().await?;
    Ok(updated)
}

/// Delete the member and the paired account in one transaction. A missing
/// account does not fail the delete.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Member> {
    let mut tx = pool.begin().await?;

    let existing = member::find_by_id_with(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))?;

    sqlx::query("DELETE FROM member WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let removed = account::delete_with(&mut tx, existing.account_id, &existing.email).await?;
    if !removed {
        tracing::debug!(member_id = %existing.member_id, "Deleted member had no paired account");
    }

    tx.commit().await?;
    Ok(existing)
}

// ── Internal helpers ─────────────────────────────────────────

fn validate_profile(
    full_name: &str,
    father_name: &str,
    mobile: &str,
    email: &str,
    address: &str,
    occupation: &str,
    annual_income: f64,
) -> RepoResult<()> {
    for (value, field) in [
        (full_name, "full_name"),
        (father_name, "father_name"),
        (mobile, "mobile"),
        (email, "email"),
        (address, "address"),
        (occupation, "occupation"),
    ] {
        if value.trim().is_empty() {
            return Err(RepoError::Validation(format!("{field} is required")));
        }
    }
    if !annual_income.is_finite() || annual_income < 0.0 {
        return Err(RepoError::Validation(
            "annual_income must be a non-negative number".into(),
        ));
    }
    Ok(())
}

async fn insert_member(
    conn: &mut SqliteConnection,
    member_id: &str,
    input: &MemberApplication,
    email: &str,
    resolved: &ResolvedPlan,
    status: &str,
    account_id: Option<i64>,
) -> RepoResult<i64> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO member (id, member_id, full_name, father_name, mobile, email, address, occupation, annual_income, membership_type, plan_id, plan_name, membership_fee, profile_image, status, account_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
    )
    .bind(id)
    .bind(member_id)
    .bind(&input.full_name)
    .bind(&input.father_name)
    .bind(&input.mobile)
    .bind(email)
    .bind(&input.address)
    .bind(&input.occupation)
    .bind(input.annual_income)
    .bind(TYPE_ONE_TIME)
    .bind(resolved.plan_id)
    .bind(&resolved.plan_name)
    .bind(resolved.fee)
    .bind(&input.profile_image)
    .bind(status)
    .bind(account_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

async fn propagate_mirror(conn: &mut SqliteConnection, member: &Member) -> RepoResult<()> {
    let mirror = AccountMirror {
        name: member.full_name.clone(),
        phone: member.mobile.clone(),
        address: member.address.clone(),
        membership_type: member.membership_type.clone(),
        membership_status: member.status.clone(),
    };
    account::update_mirror_with(conn, member.account_id, &member.email, &mirror).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE member (
                id INTEGER PRIMARY KEY,
                member_id TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                father_name TEXT NOT NULL,
                mobile TEXT NOT NULL,
                email TEXT NOT NULL,
                address TEXT NOT NULL,
                occupation TEXT NOT NULL,
                annual_income REAL NOT NULL DEFAULT 0,
                membership_type TEXT NOT NULL,
                plan_id INTEGER,
                plan_name TEXT NOT NULL DEFAULT '',
                membership_fee REAL NOT NULL DEFAULT 0,
                profile_image TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                account_id INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE account (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                address TEXT NOT NULL,
                membership_type TEXT NOT NULL,
                membership_status TEXT NOT NULL DEFAULT 'pending',
                role TEXT NOT NULL DEFAULT 'member',
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE membership_plan (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE sequence_counter (
                name TEXT PRIMARY KEY,
                seq INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    async fn seed_plan(pool: &SqlitePool, id: i64, name: &str, price: f64, created_at: i64) {
        sqlx::query("INSERT INTO membership_plan (id, name, price, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(price)
            .bind(created_at)
            .execute(pool)
            .await
            .unwrap();
    }

    fn application(email: &str, mobile: &str) -> MemberApplication {
        MemberApplication {
            full_name: "Alice Khan".into(),
            father_name: "Khan Sr".into(),
            mobile: mobile.into(),
            email: email.into(),
            address: "12 Garden Road".into(),
            occupation: "Teacher".into(),
            annual_income: 120000.0,
            plan_id: None,
            profile_image: None,
        }
    }

    fn admin_input(email: &str, mobile: &str) -> MemberCreate {
        MemberCreate {
            full_name: "Bilal Ahmed".into(),
            father_name: "Ahmed Sr".into(),
            mobile: mobile.into(),
            email: email.into(),
            address: "9 Hill Street".into(),
            occupation: "Engineer".into(),
            annual_income: 240000.0,
            plan_id: None,
            password: None,
            status: None,
        }
    }

    async fn member_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM member")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn account_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_apply_end_to_end() {
        let pool = test_pool().await;
        seed_plan(&pool, 1, "Standard", 100.0, 1000).await;

        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();

        assert_eq!(member.status, STATUS_PENDING);
        assert_eq!(member.membership_fee, 100.0);
        assert_eq!(member.plan_name, "Standard");
        assert_eq!(member.plan_id, Some(1));
        assert_eq!(member.membership_type, TYPE_ONE_TIME);
        let prefix = format!("MBR-{}-", shared::util::current_year());
        assert!(member.member_id.starts_with(&prefix));

        // Paired account: member role, password defaults to the mobile number
        let account = account::find_by_email(&pool, "a@x.com")
            .await
            .unwrap()
            .expect("paired account must exist after apply");
        assert_eq!(account.role, "member");
        assert_eq!(member.account_id, Some(account.id));
        assert!(account.verify_password("555").unwrap());
        assert_eq!(account.membership_status, STATUS_PENDING);
    }

    #[tokio::test]
    async fn test_apply_normalizes_email_on_both_stores() {
        let pool = test_pool().await;
        let member = apply(&pool, application("  Alice@Example.COM ", "555"))
            .await
            .unwrap();
        assert_eq!(member.email, "alice@example.com");
        assert!(
            account::find_by_email(&pool, "ALICE@EXAMPLE.COM")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_apply_reuses_existing_account() {
        let pool = test_pool().await;
        apply(&pool, application("a@x.com", "555")).await.unwrap();

        // Re-application with the same email keeps the single account
        let second = apply(&pool, application("a@x.com", "555")).await.unwrap();
        assert_eq!(account_count(&pool).await, 1);
        assert!(second.account_id.is_some());
        assert_eq!(member_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_apply_missing_field_writes_nothing() {
        let pool = test_pool().await;
        let mut input = application("a@x.com", "555");
        input.address = "   ".into();

        let err = apply(&pool, input).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(member_count(&pool).await, 0);
        assert_eq!(account_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_apply_without_plans_snapshots_zero_fee() {
        let pool = test_pool().await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();
        assert_eq!(member.membership_fee, 0.0);
        assert_eq!(member.plan_name, "Membership Plan");
        assert_eq!(member.plan_id, None);
    }

    #[tokio::test]
    async fn test_snapshot_survives_plan_deletion() {
        let pool = test_pool().await;
        seed_plan(&pool, 1, "Standard", 100.0, 1000).await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();

        sqlx::query("DELETE FROM membership_plan WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap();

        let reread = member::find_by_id(&pool, member.id).await.unwrap().unwrap();
        assert_eq!(reread.membership_fee, 100.0);
        assert_eq!(reread.plan_name, "Standard");
        assert_eq!(reread.plan_id, Some(1)); // reference may dangle, snapshot stays
    }

    #[tokio::test]
    async fn test_admin_create_defaults_and_password() {
        let pool = test_pool().await;
        seed_plan(&pool, 1, "Standard", 100.0, 1000).await;

        let (member, account) = admin_create(&pool, admin_input("b@x.com", "777"))
            .await
            .unwrap();
        assert_eq!(member.status, STATUS_APPROVED);
        assert_eq!(account.membership_status, STATUS_APPROVED);
        assert!(account.verify_password("777").unwrap());

        let mut with_password = admin_input("c@x.com", "888");
        with_password.password = Some("s3cret-pass".into());
        with_password.status = Some("pending".into());
        let (member, account) = admin_create(&pool, with_password).await.unwrap();
        assert_eq!(member.status, "pending");
        assert!(account.verify_password("s3cret-pass").unwrap());
        assert!(!account.verify_password("888").unwrap());
    }

    #[tokio::test]
    async fn test_admin_create_conflict_leaves_no_orphan() {
        let pool = test_pool().await;
        apply(&pool, application("a@x.com", "555")).await.unwrap();
        assert_eq!(member_count(&pool).await, 1);

        let err = admin_create(&pool, admin_input("a@x.com", "777"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // The failed account write aborted the whole operation: no second
        // member row, no second account.
        assert_eq!(member_count(&pool).await, 1);
        assert_eq!(account_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_update_propagates_mirrors_to_account() {
        let pool = test_pool().await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();

        let updated = update(
            &pool,
            member.id,
            MemberUpdate {
                full_name: Some("Alice Renamed".into()),
                mobile: Some("556".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.full_name, "Alice Renamed");

        let account = account::find_by_email(&pool, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.name, "Alice Renamed");
        assert_eq!(account.phone, "556");
    }

    #[tokio::test]
    async fn test_update_with_plan_resnapshots_fee() {
        let pool = test_pool().await;
        seed_plan(&pool, 1, "Standard", 100.0, 1000).await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();
        assert_eq!(member.membership_fee, 100.0);

        seed_plan(&pool, 2, "Gold", 500.0, 2000).await;
        let updated = update(
            &pool,
            member.id,
            MemberUpdate {
                plan_id: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.membership_fee, 500.0);
        assert_eq!(updated.plan_name, "Gold");
        assert_eq!(updated.plan_id, Some(2));
    }

    #[tokio::test]
    async fn test_update_unknown_member_is_not_found() {
        let pool = test_pool().await;
        let err = update(&pool, 42, MemberUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_status_is_permissive_and_propagates() {
        let pool = test_pool().await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();

        let approved = set_status(&pool, member.id, STATUS_APPROVED).await.unwrap();
        assert_eq!(approved.status, STATUS_APPROVED);

        // Approved straight back to pending: no transition guard
        let back = set_status(&pool, member.id, STATUS_PENDING).await.unwrap();
        assert_eq!(back.status, STATUS_PENDING);

        let account = account::find_by_email(&pool, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.membership_status, STATUS_PENDING);

        let err = set_status(&pool, member.id, "archived").await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_account() {
        let pool = test_pool().await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();

        delete(&pool, member.id).await.unwrap();
        assert_eq!(member_count(&pool).await, 0);
        assert_eq!(account_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_delete_without_account_still_succeeds() {
        let pool = test_pool().await;
        let member = apply(&pool, application("a@x.com", "555")).await.unwrap();

        sqlx::query("DELETE FROM account")
            .execute(&pool)
            .await
            .unwrap();

        delete(&pool, member.id).await.unwrap();
        assert_eq!(member_count(&pool).await, 0);

        let err = delete(&pool, member.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_member_ids_not_reused_after_delete() {
        let pool = test_pool().await;
        let first = apply(&pool, application("a@x.com", "555")).await.unwrap();
        let first_id = first.member_id.clone();
        delete(&pool, first.id).await.unwrap();

        let second = apply(&pool, application("b@x.com", "666")).await.unwrap();
        assert_ne!(second.member_id, first_id);
    }
}
