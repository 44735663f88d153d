//! Member Repository
//!
//! Reads over the membership records. All writes go through the
//! [`membership`](super::membership) coordinator so the paired account
//! stays consistent.

use super::RepoResult;
use shared::models::{
    Member, MemberStats, Page, STATUS_APPROVED, STATUS_PENDING, TYPE_LIFETIME, TYPE_ONE_TIME,
    TYPE_ONE_TIME_LEGACY, normalize_membership_type,
};
use shared::util::normalize_email;
use sqlx::{SqliteConnection, SqlitePool};

const MEMBER_SELECT: &str = "SELECT id, member_id, full_name, father_name, mobile, email, address, occupation, annual_income, membership_type, plan_id, plan_name, membership_fee, profile_image, status, account_id, created_at, updated_at FROM member";

/// Listing filters for the admin member list.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub status: Option<String>,
    pub membership_type: Option<String>,
    pub q: Option<String>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub(crate) async fn find_by_id_with(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Look up a member by database id or by the human-readable member ID.
pub async fn find_by_identifier(pool: &SqlitePool, identifier: &str) -> RepoResult<Option<Member>> {
    let ident = identifier.trim();
    let row = if let Ok(id) = ident.parse::<i64>() {
        let sql = format!("{MEMBER_SELECT} WHERE id = ?1 OR member_id = ?2");
        sqlx::query_as::<_, Member>(&sql)
            .bind(id)
            .bind(ident)
            .fetch_optional(pool)
            .await?
    } else {
        let sql = format!("{MEMBER_SELECT} WHERE member_id = ?");
        sqlx::query_as::<_, Member>(&sql)
            .bind(ident)
            .fetch_optional(pool)
            .await?
    };
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fallback lookup used when an admin passes a linked account's identifiers.
pub async fn find_by_email_or_mobile(
    pool: &SqlitePool,
    email: &str,
    mobile: &str,
) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE email = ?1 OR mobile = ?2");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(normalize_email(email))
        .bind(mobile)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

fn build_filters(filter: &MemberFilter) -> (String, Vec<String>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(status) = &filter.status
        && !status.is_empty()
    {
        clauses.push("status = ?");
        binds.push(status.clone());
    }

    if let Some(membership_type) = &filter.membership_type
        && !membership_type.is_empty()
    {
        let normalized = normalize_membership_type(membership_type);
        if normalized == TYPE_ONE_TIME {
            // Legacy rows may carry the old spelling
            clauses.push("membership_type IN (?, ?)");
            binds.push(TYPE_ONE_TIME.to_string());
            binds.push(TYPE_ONE_TIME_LEGACY.to_string());
        } else {
            clauses.push("membership_type = ?");
            binds.push(normalized.to_string());
        }
    }

    if let Some(q) = &filter.q {
        let q = q.trim();
        if !q.is_empty() {
            // SQLite LIKE is case-insensitive for ASCII
            clauses.push("(full_name LIKE ? OR email LIKE ? OR mobile LIKE ? OR member_id LIKE ?)");
            let pattern = format!("%{q}%");
            for _ in 0..4 {
                binds.push(pattern.clone());
            }
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (where_sql, binds)
}

/// Admin member list: filtered, newest first, paginated.
pub async fn list(
    pool: &SqlitePool,
    filter: &MemberFilter,
    page: i64,
    limit: i64,
) -> RepoResult<Page<Member>> {
    let page = page.max(1);
    let limit = limit.max(1);
    let (where_sql, binds) = build_filters(filter);

    let sql = format!("{MEMBER_SELECT}{where_sql} ORDER BY created_at DESC LIMIT ? OFFSET ?");
    let mut query = sqlx::query_as::<_, Member>(&sql);
    for bind in &binds {
        query = query.bind(bind.as_str());
    }
    let items = query
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM member{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind.as_str());
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(Page {
        items,
        total,
        page,
        limit,
    })
}

/// Public member directory: approved members only, name/member-ID search.
pub async fn list_public(
    pool: &SqlitePool,
    q: Option<&str>,
    page: i64,
    limit: i64,
) -> RepoResult<Page<Member>> {
    let page = page.max(1);
    let limit = limit.max(1);

    let mut where_sql = " WHERE status = ?".to_string();
    let mut binds: Vec<String> = vec![STATUS_APPROVED.to_string()];
    if let Some(q) = q {
        let q = q.trim();
        if !q.is_empty() {
            where_sql.push_str(" AND (full_name LIKE ? OR member_id LIKE ?)");
            let pattern = format!("%{q}%");
            binds.push(pattern.clone());
            binds.push(pattern);
        }
    }

    let sql = format!("{MEMBER_SELECT}{where_sql} ORDER BY created_at DESC LIMIT ? OFFSET ?");
    let mut query = sqlx::query_as::<_, Member>(&sql);
    for bind in &binds {
        query = query.bind(bind.as_str());
    }
    let items = query
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM member{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind.as_str());
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(Page {
        items,
        total,
        page,
        limit,
    })
}

/// Approved-member counts for the public stats endpoint.
pub async fn stats(pool: &SqlitePool) -> RepoResult<MemberStats> {
    let total_members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE status = ?")
        .bind(STATUS_APPROVED)
        .fetch_one(pool)
        .await?;
    let lifetime_members: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE status = ? AND membership_type = ?")
            .bind(STATUS_APPROVED)
            .bind(TYPE_LIFETIME)
            .fetch_one(pool)
            .await?;
    let one_time_members: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM member WHERE status = ? AND membership_type IN (?, ?)",
    )
    .bind(STATUS_APPROVED)
    .bind(TYPE_ONE_TIME)
    .bind(TYPE_ONE_TIME_LEGACY)
    .fetch_one(pool)
    .await?;

    Ok(MemberStats {
        total_members,
        lifetime_members,
        one_time_members,
    })
}

/// Counters for the admin dashboard (all statuses).
pub async fn summary_counts(pool: &SqlitePool) -> RepoResult<(i64, i64, i64, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member")
        .fetch_one(pool)
        .await?;
    let lifetime: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE membership_type = ?")
        .bind(TYPE_LIFETIME)
        .fetch_one(pool)
        .await?;
    let one_time: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE membership_type IN (?, ?)")
            .bind(TYPE_ONE_TIME)
            .bind(TYPE_ONE_TIME_LEGACY)
            .fetch_one(pool)
            .await?;
    let pending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE status = ?")
        .bind(STATUS_PENDING)
        .fetch_one(pool)
        .await?;
    Ok((total, lifetime, one_time, pending))
}

/// Full dump for the CSV export, newest first.
pub async fn export_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let sql = format!("{MEMBER_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Member>(&sql).fetch_all(pool).await?;
    Ok(rows)
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
                father_name TEXT NOT NULL DEFAULT '',
                mobile TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                occupation TEXT NOT NULL DEFAULT '',
                annual_income REAL NOT NULL DEFAULT 0,
                membership_type TEXT NOT NULL DEFAULT 'one-time',
                plan_id INTEGER,
                plan_name TEXT NOT NULL DEFAULT '',
                membership_fee REAL NOT NULL DEFAULT 0,
                profile_image TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                account_id INTEGER,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[allow(clippy::too_many_arguments)]
    async fn seed_member(
        pool: &SqlitePool,
        id: i64,
        member_id: &str,
        full_name: &str,
        email: &str,
        mobile: &str,
        membership_type: &str,
        status: &str,
        created_at: i64,
    ) {
        sqlx::query(
            "INSERT INTO member (id, member_id, full_name, email, mobile, membership_type, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(member_id)
        .bind(full_name)
        .bind(email)
        .bind(mobile)
        .bind(membership_type)
        .bind(status)
        .bind(created_at)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_default_set(pool: &SqlitePool) {
        seed_member(pool, 1, "MBR-2026-00001", "Alice Khan", "alice@x.com", "111", "one-time", "approved", 1000).await;
        seed_member(pool, 2, "MBR-2026-00002", "Bilal Ahmed", "bilal@x.com", "222", "onetime", "pending", 2000).await;
        seed_member(pool, 3, "MBR-2025-00003", "Carim Noor", "carim@x.com", "333", "lifetime", "approved", 3000).await;
        seed_member(pool, 4, "MBR-2026-00004", "Dawood Ali", "dawood@x.com", "444", "one-time", "rejected", 4000).await;
    }

    #[tokio::test]
    async fn test_find_by_identifier_accepts_both_forms() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        let by_db_id = find_by_identifier(&pool, "1").await.unwrap().unwrap();
        assert_eq!(by_db_id.member_id, "MBR-2026-00001");

        let by_member_id = find_by_identifier(&pool, "MBR-2025-00003")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_member_id.full_name, "Carim Noor");

        assert!(find_by_identifier(&pool, "MBR-0000-99999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        let filter = MemberFilter {
            status: Some("approved".into()),
            ..Default::default()
        };
        let page = list(&pool, &filter, 1, 10).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|m| m.status == "approved"));
    }

    #[tokio::test]
    async fn test_list_normalizes_legacy_type_spellings() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        // "onetime" and "one-time" both match the one-time filter
        for spelling in ["one-time", "onetime"] {
            let filter = MemberFilter {
                membership_type: Some(spelling.into()),
                ..Default::default()
            };
            let page = list(&pool, &filter, 1, 10).await.unwrap();
            assert_eq!(page.total, 3, "filter spelling {spelling}");
        }

        let filter = MemberFilter {
            membership_type: Some("lifetime".into()),
            ..Default::default()
        };
        assert_eq!(list(&pool, &filter, 1, 10).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive_across_fields() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        for (q, expected) in [("alice", 1), ("BILAL", 1), ("333", 1), ("mbr-2026", 3)] {
            let filter = MemberFilter {
                q: Some(q.into()),
                ..Default::default()
            };
            let page = list(&pool, &filter, 1, 10).await.unwrap();
            assert_eq!(page.total, expected, "query {q}");
        }
    }

    #[tokio::test]
    async fn test_list_paginates_newest_first() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        let first = list(&pool, &MemberFilter::default(), 1, 2).await.unwrap();
        assert_eq!(first.total, 4);
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].id, 4);
        assert_eq!(first.items[1].id, 3);

        let second = list(&pool, &MemberFilter::default(), 2, 2).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].id, 2);
        assert_eq!(second.items[1].id, 1);
    }

    #[tokio::test]
    async fn test_public_list_only_approved() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        let page = list_public(&pool, None, 1, 10).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|m| m.status == "approved"));

        let searched = list_public(&pool, Some("carim"), 1, 10).await.unwrap();
        assert_eq!(searched.total, 1);
    }

    #[tokio::test]
    async fn test_stats_and_summary_counts() {
        let pool = test_pool().await;
        seed_default_set(&pool).await;

        let stats = stats(&pool).await.unwrap();
        assert_eq!(stats.total_members, 2); // approved only
        assert_eq!(stats.lifetime_members, 1);
        assert_eq!(stats.one_time_members, 1);

        let (total, lifetime, one_time, pending) = summary_counts(&pool).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(lifetime, 1);
        assert_eq!(one_time, 3);
        assert_eq!(pending, 1);
    }
}
