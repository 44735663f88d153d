//! Sequence Counter Repository
//!
//! Monotonic named counters behind a single atomic upsert. The member ID
//! allocator formats the post-increment value as `MBR-<year>-<seq>`; a
//! sequence, once issued, is never reused: the counter is never
//! decremented or reset, even when member records are deleted.

use super::RepoResult;
use sqlx::SqlitePool;

/// Counter backing the member ID allocator.
pub const MEMBER_COUNTER: &str = "member";

/// Atomically increment the named counter and return the new value.
///
/// Single-statement upsert: concurrent callers can never observe the same
/// post-increment value twice.
pub async fn next_seq(pool: &SqlitePool, name: &str) -> RepoResult<i64> {
    let seq: i64 = sqlx::query_scalar(
        "INSERT INTO sequence_counter (name, seq) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET seq = seq + 1
         RETURNING seq",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(seq)
}

/// Format a member identifier. Zero-padded to five digits; the padding
/// simply widens past 99999.
pub fn format_member_id(year: i32, seq: i64) -> String {
    format!("MBR-{year}-{seq:05}")
}

/// Allocate the next human-readable member identifier.
pub async fn allocate_member_id(pool: &SqlitePool) -> RepoResult<String> {
    let seq = next_seq(pool, MEMBER_COUNTER).await?;
    Ok(format_member_id(shared::util::current_year(), seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::collections::HashSet;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
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

    fn assert_member_id_shape(id: &str) {
        let prefix = format!("MBR-{}-", shared::util::current_year());
        assert!(id.starts_with(&prefix), "unexpected id: {id}");
        let suffix = &id[prefix.len()..];
        assert!(suffix.len() >= 5, "suffix too short: {id}");
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_format_member_id_padding() {
        assert_eq!(format_member_id(2026, 1), "MBR-2026-00001");
        assert_eq!(format_member_id(2026, 99999), "MBR-2026-99999");
        // Beyond five digits the padding widens, no overflow error
        assert_eq!(format_member_id(2026, 100000), "MBR-2026-100000");
    }

    #[tokio::test]
    async fn test_sequences_start_at_one_and_increase() {
        let pool = test_pool().await;
        assert_eq!(next_seq(&pool, MEMBER_COUNTER).await.unwrap(), 1);
        assert_eq!(next_seq(&pool, MEMBER_COUNTER).await.unwrap(), 2);
        assert_eq!(next_seq(&pool, MEMBER_COUNTER).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_counters_are_independent() {
        let pool = test_pool().await;
        assert_eq!(next_seq(&pool, "member").await.unwrap(), 1);
        assert_eq!(next_seq(&pool, "receipt").await.unwrap(), 1);
        assert_eq!(next_seq(&pool, "member").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_allocate_member_id_shape_and_monotonicity() {
        let pool = test_pool().await;
        let first = allocate_member_id(&pool).await.unwrap();
        let second = allocate_member_id(&pool).await.unwrap();
        assert_member_id_shape(&first);
        assert_member_id_shape(&second);

        let suffix = |id: &str| id.rsplit('-').next().unwrap().parse::<i64>().unwrap();
        assert!(suffix(&second) > suffix(&first));
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct() {
        let pool = test_pool().await;

        let mut handles = Vec::new();
        for _ in 0..25 {
            let pool = pool.clone();
            handles.push(tokio::spawn(
                async move { allocate_member_id(&pool).await },
            ));
        }

        let mut ids = HashSet::new();
        for result in futures::future::join_all(handles).await {
            let id = result.unwrap().unwrap();
            assert_member_id_shape(&id);
            ids.insert(id);
        }
        assert_eq!(ids.len(), 25);
    }
}
