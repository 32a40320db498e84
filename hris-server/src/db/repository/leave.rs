//! Leave Request Repository

use super::{Page, RepoError, RepoResult};
use shared::models::{LeaveRequest, LeaveStatus, LeaveType};
use sqlx::SqlitePool;

const LEAVE_SELECT: &str = "SELECT id, company_id, employee_id, leave_type, start_date, end_date, days, reason, status, reviewed_by, review_note, reviewed_at, created_at, updated_at FROM leave_requests";

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub company_id: i64,
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub start_date: String,
    pub end_date: String,
    pub days: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<i64>,
}

pub async fn find_by_id(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
) -> RepoResult<Option<LeaveRequest>> {
    let row = sqlx::query_as::<_, LeaveRequest>(&format!(
        "{LEAVE_SELECT} WHERE company_id = ? AND id = ?"
    ))
    .bind(company_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// First PENDING/APPROVED request of the employee intersecting `[start, end]`
pub async fn find_overlapping(
    pool: &SqlitePool,
    employee_id: i64,
    start_date: &str,
    end_date: &str,
) -> RepoResult<Option<LeaveRequest>> {
    let row = sqlx::query_as::<_, LeaveRequest>(&format!(
        "{LEAVE_SELECT} WHERE employee_id = ? AND status IN ('PENDING', 'APPROVED') AND start_date <= ? AND end_date >= ? LIMIT 1"
    ))
    .bind(employee_id)
    .bind(end_date)
    .bind(start_date)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn insert(pool: &SqlitePool, data: NewLeave) -> RepoResult<LeaveRequest> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO leave_requests (id, company_id, employee_id, leave_type, start_date, end_date, days, reason, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'PENDING', ?9, ?9)",
    )
    .bind(id)
    .bind(data.company_id)
    .bind(data.employee_id)
    .bind(data.leave_type)
    .bind(&data.start_date)
    .bind(&data.end_date)
    .bind(data.days)
    .bind(&data.reason)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, data.company_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create leave request".into()))
}

/// Move a PENDING request to `to`. Returns rows changed (0 if it was no longer pending).
pub async fn resolve_pending(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
    to: LeaveStatus,
    reviewer: Option<i64>,
    note: Option<&str>,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE leave_requests SET status = ?1, reviewed_by = ?2, review_note = ?3, reviewed_at = CASE WHEN ?2 IS NULL THEN reviewed_at ELSE ?4 END, updated_at = ?4 WHERE id = ?5 AND company_id = ?6 AND status = 'PENDING'",
    )
    .bind(to)
    .bind(reviewer)
    .bind(note)
    .bind(now)
    .bind(id)
    .bind(company_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn find_page(
    pool: &SqlitePool,
    company_id: i64,
    filter: &LeaveFilter,
    limit: u32,
    offset: i64,
) -> RepoResult<Page<LeaveRequest>> {
    let clause = "company_id = ?1 AND (?2 IS NULL OR status = ?2) AND (?3 IS NULL OR employee_id = ?3)";

    let rows = sqlx::query_as::<_, LeaveRequest>(&format!(
        "{LEAVE_SELECT} WHERE {clause} ORDER BY created_at DESC LIMIT ?4 OFFSET ?5"
    ))
    .bind(company_id)
    .bind(filter.status)
    .bind(filter.employee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM leave_requests WHERE {clause}"))
            .bind(company_id)
            .bind(filter.status)
            .bind(filter.employee_id)
            .fetch_one(pool)
            .await?;

    Ok((rows, total as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_employee, test_pool};

    fn leave(employee_id: i64, start: &str, end: &str) -> NewLeave {
        NewLeave {
            company_id: 1,
            employee_id,
            leave_type: LeaveType::Annual,
            start_date: start.into(),
            end_date: end.into(),
            days: 1,
            reason: None,
        }
    }

    #[tokio::test]
    async fn test_overlap_ignores_rejected_and_cancelled() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "a@example.com").await;
        let req = insert(&pool, leave(emp.id, "2024-05-06", "2024-05-10"))
            .await
            .unwrap();

        assert!(find_overlapping(&pool, emp.id, "2024-05-10", "2024-05-12")
            .await
            .unwrap()
            .is_some());
        assert!(find_overlapping(&pool, emp.id, "2024-05-11", "2024-05-12")
            .await
            .unwrap()
            .is_none());

        assert_eq!(
            resolve_pending(&pool, 1, req.id, LeaveStatus::Rejected, Some(9), Some("busy"))
                .await
                .unwrap(),
            1
        );
        assert!(find_overlapping(&pool, emp.id, "2024-05-06", "2024-05-10")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resolve_only_pending() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "a@example.com").await;
        let req = insert(&pool, leave(emp.id, "2024-05-06", "2024-05-06"))
            .await
            .unwrap();

        assert_eq!(
            resolve_pending(&pool, 1, req.id, LeaveStatus::Approved, Some(9), None)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            resolve_pending(&pool, 1, req.id, LeaveStatus::Cancelled, None, None)
                .await
                .unwrap(),
            0
        );

        let row = find_by_id(&pool, 1, req.id).await.unwrap().unwrap();
        assert_eq!(row.status, LeaveStatus::Approved);
        assert_eq!(row.reviewed_by, Some(9));
        assert!(row.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_find_page_by_status() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "a@example.com").await;
        let first = insert(&pool, leave(emp.id, "2024-05-06", "2024-05-06"))
            .await
            .unwrap();
        insert(&pool, leave(emp.id, "2024-06-03", "2024-06-03"))
            .await
            .unwrap();
        resolve_pending(&pool, 1, first.id, LeaveStatus::Approved, Some(9), None)
            .await
            .unwrap();

        let filter = LeaveFilter {
            status: Some(LeaveStatus::Pending),
            employee_id: None,
        };
        let (rows, total) = find_page(&pool, 1, &filter, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].start_date, "2024-06-03");
    }
}
