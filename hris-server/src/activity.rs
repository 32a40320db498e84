//! Activity log: who changed what

use serde_json::Value;
use shared::error::AppResult;
use shared::models::ActivityLog;
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::Page;
use crate::db::repository::activity_log::{self as repo, NewActivity};

/// Append an entry after a mutation. Errors are logged and swallowed.
pub async fn record(
    pool: &SqlitePool,
    user: &CurrentUser,
    action: &str,
    entity: &str,
    entity_id: Option<i64>,
    detail: Option<Value>,
) {
    let entry = NewActivity {
        company_id: user.company_id,
        user_id: Some(user.id),
        action,
        entity,
        entity_id,
        detail: detail.map(|d| d.to_string()),
    };
    if let Err(e) = repo::insert(pool, &entry).await {
        tracing::warn!(
            company_id = user.company_id,
            action,
            entity,
            "Failed to record activity: {e}"
        );
    }
}

pub async fn list(
    pool: &SqlitePool,
    company_id: i64,
    entity: Option<&str>,
    limit: u32,
    offset: i64,
) -> AppResult<Page<ActivityLog>> {
    Ok(repo::find_page(pool, company_id, entity, limit, offset).await?)
}
