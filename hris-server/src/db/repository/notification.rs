//! Notification Repository

use super::{Page, RepoError, RepoResult};
use shared::models::{Notification, NotificationKind};
use sqlx::SqlitePool;

const NOTIFICATION_SELECT: &str =
    "SELECT id, company_id, user_id, kind, title, message, is_read, created_at FROM notifications";

pub async fn insert(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
    kind: NotificationKind,
    title: &str,
    message: &str,
) -> RepoResult<Notification> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO notifications (id, company_id, user_id, kind, title, message, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(company_id)
    .bind(user_id)
    .bind(kind)
    .bind(title)
    .bind(message)
    .bind(now)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Notification>(&format!("{NOTIFICATION_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create notification".into()))
}

pub async fn find_page(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
    unread_only: bool,
    limit: u32,
    offset: i64,
) -> RepoResult<Page<Notification>> {
    let clause = "company_id = ?1 AND user_id = ?2 AND (?3 = 0 OR is_read = 0)";

    let rows = sqlx::query_as::<_, Notification>(&format!(
        "{NOTIFICATION_SELECT} WHERE {clause} ORDER BY created_at DESC, id DESC LIMIT ?4 OFFSET ?5"
    ))
    .bind(company_id)
    .bind(user_id)
    .bind(unread_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM notifications WHERE {clause}"))
            .bind(company_id)
            .bind(user_id)
            .bind(unread_only)
            .fetch_one(pool)
            .await?;

    Ok((rows, total as u64))
}

/// Returns rows changed (0 when the id does not belong to the user)
pub async fn mark_read(pool: &SqlitePool, company_id: i64, user_id: i64, id: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE notifications SET is_read = 1 WHERE id = ? AND company_id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(company_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn mark_all_read(pool: &SqlitePool, company_id: i64, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE notifications SET is_read = 1 WHERE company_id = ? AND user_id = ? AND is_read = 0",
    )
    .bind(company_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    #[tokio::test]
    async fn test_unread_filter_and_mark_read() {
        let pool = test_pool().await;
        let first = insert(&pool, 1, 10, NotificationKind::Leave, "Leave approved", "See you")
            .await
            .unwrap();
        insert(&pool, 1, 10, NotificationKind::Payroll, "Payslip ready", "March")
            .await
            .unwrap();
        insert(&pool, 1, 11, NotificationKind::Info, "Other user", "x")
            .await
            .unwrap();

        assert_eq!(mark_read(&pool, 1, 10, first.id).await.unwrap(), 1);
        // Another user cannot mark it
        assert_eq!(mark_read(&pool, 1, 11, first.id).await.unwrap(), 0);

        let (rows, total) = find_page(&pool, 1, 10, true, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].title, "Payslip ready");

        assert_eq!(mark_all_read(&pool, 1, 10).await.unwrap(), 1);
        let (_, unread) = find_page(&pool, 1, 10, true, 20, 0).await.unwrap();
        assert_eq!(unread, 0);
        let (_, all) = find_page(&pool, 1, 10, false, 20, 0).await.unwrap();
        assert_eq!(all, 2);
    }
}
