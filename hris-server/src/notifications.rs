//! In-app notifications

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Notification, NotificationKind};
use sqlx::SqlitePool;

use crate::db::repository::{Page, notification as repo};

/// Deliver a notification to a user.
///
/// Delivery happens after the triggering state change has been committed,
/// so a failure here is logged and does not undo that change.
pub async fn notify(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
    kind: NotificationKind,
    title: &str,
    message: &str,
) {
    if let Err(e) = repo::insert(pool, company_id, user_id, kind, title, message).await {
        tracing::warn!(company_id, user_id, ?kind, "Failed to deliver notification: {e}");
    }
}

pub async fn list(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
    unread_only: bool,
    limit: u32,
    offset: i64,
) -> AppResult<Page<Notification>> {
    Ok(repo::find_page(pool, company_id, user_id, unread_only, limit, offset).await?)
}

/// Mark one of the user's notifications as read
pub async fn mark_read(pool: &SqlitePool, company_id: i64, user_id: i64, id: i64) -> AppResult<()> {
    match repo::mark_read(pool, company_id, user_id, id).await? {
        0 => Err(AppError::new(ErrorCode::NotificationNotFound).with_detail("id", id)),
        _ => Ok(()),
    }
}

/// Mark everything read; returns how many were unread
pub async fn mark_all_read(pool: &SqlitePool, company_id: i64, user_id: i64) -> AppResult<u64> {
    Ok(repo::mark_all_read(pool, company_id, user_id).await?)
}
