//! Leave requests
//!
//! An employee files a request (`PENDING`); a manager approves or rejects it,
//! or the employee cancels it while it is still pending.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Employee, LeaveCreate, LeaveRequest, LeaveStatus, NotificationKind};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::db::repository::leave::{self as repo, LeaveFilter, NewLeave};
use crate::db::repository::{Page, employee};
use crate::notifications;
use crate::utils::time;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

/// Longest single request, in calendar days
const MAX_LEAVE_DAYS: i64 = 366;

/// File a new request for `employee`
pub async fn create(pool: &SqlitePool, employee: &Employee, data: LeaveCreate) -> AppResult<LeaveRequest> {
    let start = time::parse_date(&data.start_date)?;
    let end = time::parse_date(&data.end_date)?;
    if end < start {
        return Err(AppError::new(ErrorCode::LeaveInvalidRange)
            .with_detail("start_date", data.start_date)
            .with_detail("end_date", data.end_date));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_LEAVE_DAYS {
        return Err(AppError::with_message(
            ErrorCode::LeaveInvalidRange,
            format!("Leave cannot exceed {MAX_LEAVE_DAYS} days"),
        ));
    }

    let reason = data
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    validate_optional_text(&reason, "reason", MAX_NOTE_LEN)?;

    let start_date = time::format_date(start);
    let end_date = time::format_date(end);
    if let Some(existing) = repo::find_overlapping(pool, employee.id, &start_date, &end_date).await? {
        return Err(AppError::new(ErrorCode::LeaveOverlap)
            .with_detail("conflicting_id", existing.id)
            .with_detail("status", existing.status.as_str()));
    }

    let request = repo::insert(
        pool,
        NewLeave {
            company_id: employee.company_id,
            employee_id: employee.id,
            leave_type: data.leave_type,
            start_date,
            end_date,
            days,
            reason,
        },
    )
    .await?;

    info!(
        company_id = employee.company_id,
        employee_id = employee.id,
        leave_id = request.id,
        days,
        "Leave requested"
    );
    Ok(request)
}

pub async fn get(pool: &SqlitePool, company_id: i64, id: i64) -> AppResult<LeaveRequest> {
    repo::find_by_id(pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LeaveNotFound).with_detail("id", id))
}

async fn transition(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
    to: LeaveStatus,
    reviewer: Option<i64>,
    note: Option<String>,
) -> AppResult<LeaveRequest> {
    let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    validate_optional_text(&note, "note", MAX_NOTE_LEN)?;

    let changed = repo::resolve_pending(pool, company_id, id, to, reviewer, note.as_deref()).await?;
    let current = get(pool, company_id, id).await?;
    if changed == 0 {
        return Err(AppError::new(ErrorCode::LeaveInvalidStatus)
            .with_detail("status", current.status.as_str())
            .with_detail("target", to.as_str()));
    }
    Ok(current)
}

/// Tell the requester about the verdict; the review itself already stands
async fn notify_owner(pool: &SqlitePool, request: &LeaveRequest, to: LeaveStatus) {
    let owner = match employee::find_by_id(pool, request.company_id, request.employee_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            warn!(leave_id = request.id, "Leave owner no longer exists");
            return;
        }
        Err(e) => {
            warn!(leave_id = request.id, "Failed to look up leave owner: {e}");
            return;
        }
    };

    let verdict = match to {
        LeaveStatus::Approved => "approved",
        _ => "rejected",
    };
    let message = match &request.review_note {
        Some(note) => format!(
            "Your leave {} to {} was {verdict}: {note}",
            request.start_date, request.end_date
        ),
        None => format!(
            "Your leave {} to {} was {verdict}",
            request.start_date, request.end_date
        ),
    };
    notifications::notify(
        pool,
        request.company_id,
        owner.user_id,
        NotificationKind::Leave,
        &format!("Leave {verdict}"),
        &message,
    )
    .await;
}

/// Approve or reject a pending request and notify its owner
async fn review(
    pool: &SqlitePool,
    reviewer: &CurrentUser,
    id: i64,
    to: LeaveStatus,
    note: Option<String>,
) -> AppResult<LeaveRequest> {
    let request = transition(pool, reviewer.company_id, id, to, Some(reviewer.id), note).await?;
    info!(
        company_id = reviewer.company_id,
        leave_id = id,
        status = to.as_str(),
        "Leave reviewed"
    );

    notify_owner(pool, &request, to).await;
    Ok(request)
}

pub async fn approve(
    pool: &SqlitePool,
    reviewer: &CurrentUser,
    id: i64,
    note: Option<String>,
) -> AppResult<LeaveRequest> {
    review(pool, reviewer, id, LeaveStatus::Approved, note).await
}

pub async fn reject(
    pool: &SqlitePool,
    reviewer: &CurrentUser,
    id: i64,
    note: Option<String>,
) -> AppResult<LeaveRequest> {
    review(pool, reviewer, id, LeaveStatus::Rejected, note).await
}

/// Withdraw one's own pending request
pub async fn cancel(pool: &SqlitePool, employee: &Employee, id: i64) -> AppResult<LeaveRequest> {
    let request = get(pool, employee.company_id, id).await?;
    if request.employee_id != employee.id {
        // Do not reveal other employees' requests
        return Err(AppError::new(ErrorCode::LeaveNotFound).with_detail("id", id));
    }
    let cancelled = transition(pool, employee.company_id, id, LeaveStatus::Cancelled, None, None).await?;
    info!(company_id = employee.company_id, leave_id = id, "Leave cancelled");
    Ok(cancelled)
}

pub async fn list(
    pool: &SqlitePool,
    company_id: i64,
    filter: &LeaveFilter,
    limit: u32,
    offset: i64,
) -> AppResult<Page<LeaveRequest>> {
    Ok(repo::find_page(pool, company_id, filter, limit, offset).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_employee, test_pool};
    use shared::models::{LeaveType, Role};

    fn request(start: &str, end: &str) -> LeaveCreate {
        LeaveCreate {
            leave_type: LeaveType::Annual,
            start_date: start.into(),
            end_date: end.into(),
            reason: Some("Family trip".into()),
        }
    }

    fn manager() -> CurrentUser {
        CurrentUser {
            id: 900,
            company_id: 1,
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_create_counts_inclusive_days() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;

        let leave = create(&pool, &emp, request("2024-03-04", "2024-03-08")).await.unwrap();
        assert_eq!(leave.days, 5);
        assert_eq!(leave.status, LeaveStatus::Pending);

        let single = create(&pool, &emp, request("2024-04-01", "2024-04-01")).await.unwrap();
        assert_eq!(single.days, 1);
    }

    #[tokio::test]
    async fn test_invalid_range_and_overlap() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;

        let err = create(&pool, &emp, request("2024-03-08", "2024-03-04")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeaveInvalidRange);

        let err = create(&pool, &emp, request("2024-13-01", "2024-13-02")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let first = create(&pool, &emp, request("2024-03-04", "2024-03-08")).await.unwrap();
        let err = create(&pool, &emp, request("2024-03-08", "2024-03-10")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeaveOverlap);

        // A rejected request no longer blocks the dates
        reject(&pool, &manager(), first.id, None).await.unwrap();
        create(&pool, &emp, request("2024-03-08", "2024-03-10")).await.unwrap();
    }

    #[tokio::test]
    async fn test_reason_length() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        let mut data = request("2024-03-04", "2024-03-04");
        data.reason = Some("x".repeat(MAX_NOTE_LEN + 1));
        let err = create(&pool, &emp, data).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_approve_notifies_and_locks_status() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        let leave = create(&pool, &emp, request("2024-03-04", "2024-03-05")).await.unwrap();

        let approved = approve(&pool, &manager(), leave.id, Some("Enjoy".into())).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.reviewed_by, Some(900));
        assert_eq!(approved.review_note.as_deref(), Some("Enjoy"));
        assert!(approved.reviewed_at.is_some());

        let err = reject(&pool, &manager(), leave.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeaveInvalidStatus);
        let err = cancel(&pool, &emp, leave.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeaveInvalidStatus);

        let (notes, _) = notifications::list(&pool, 1, emp.user_id, true, 20, 0).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Leave approved");
    }

    #[tokio::test]
    async fn test_review_survives_failed_notification() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        let first = create(&pool, &emp, request("2024-03-04", "2024-03-05")).await.unwrap();
        let second = create(&pool, &emp, request("2024-04-01", "2024-04-02")).await.unwrap();

        sqlx::query("PRAGMA foreign_keys = OFF").execute(&pool).await.unwrap();
        sqlx::query("DROP TABLE notifications").execute(&pool).await.unwrap();
        let approved = approve(&pool, &manager(), first.id, None).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);

        // Owner lookup itself fails
        sqlx::query("DROP TABLE users").execute(&pool).await.unwrap();
        let rejected = reject(&pool, &manager(), second.id, Some("Busy week".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(get(&pool, 1, second.id).await.unwrap().status, LeaveStatus::Rejected);
    }

    #[tokio::test]
    async fn test_cancel_only_own_request() {
        let pool = test_pool().await;
        let owner = seed_employee(&pool, 1, "budi@example.com").await;
        let other = seed_employee(&pool, 1, "sari@example.com").await;
        let leave = create(&pool, &owner, request("2024-03-04", "2024-03-05")).await.unwrap();

        let err = cancel(&pool, &other, leave.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeaveNotFound);

        let cancelled = cancel(&pool, &owner, leave.id).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);
        assert!(cancelled.reviewed_by.is_none());
    }

    #[tokio::test]
    async fn test_review_is_tenant_scoped() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 2, "budi@example.com").await;
        let leave = create(&pool, &emp, request("2024-03-04", "2024-03-05")).await.unwrap();

        let err = approve(&pool, &manager(), leave.id, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeaveNotFound);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let pool = test_pool().await;
        let a = seed_employee(&pool, 1, "a@example.com").await;
        let b = seed_employee(&pool, 1, "b@example.com").await;
        let first = create(&pool, &a, request("2024-03-04", "2024-03-05")).await.unwrap();
        create(&pool, &b, request("2024-03-04", "2024-03-05")).await.unwrap();
        approve(&pool, &manager(), first.id, None).await.unwrap();

        let pending = LeaveFilter {
            status: Some(LeaveStatus::Pending),
            ..Default::default()
        };
        let (rows, total) = list(&pool, 1, &pending, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].employee_id, b.id);

        let own = LeaveFilter {
            employee_id: Some(a.id),
            ..Default::default()
        };
        assert_eq!(list(&pool, 1, &own, 20, 0).await.unwrap().1, 1);
    }
}
