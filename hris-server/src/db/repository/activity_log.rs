//! Activity Log Repository

use super::{Page, RepoResult};
use shared::models::ActivityLog;
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct NewActivity<'a> {
    pub company_id: i64,
    pub user_id: Option<i64>,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: Option<i64>,
    pub detail: Option<String>,
}

pub async fn insert(pool: &SqlitePool, entry: &NewActivity<'_>) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO activity_logs (id, company_id, user_id, action, entity, entity_id, detail, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(entry.company_id)
    .bind(entry.user_id)
    .bind(entry.action)
    .bind(entry.entity)
    .bind(entry.entity_id)
    .bind(&entry.detail)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn find_page(
    pool: &SqlitePool,
    company_id: i64,
    entity: Option<&str>,
    limit: u32,
    offset: i64,
) -> RepoResult<Page<ActivityLog>> {
    let clause = "company_id = ?1 AND (?2 IS NULL OR entity = ?2)";

    let rows = sqlx::query_as::<_, ActivityLog>(&format!(
        "SELECT id, company_id, user_id, action, entity, entity_id, detail, created_at FROM activity_logs WHERE {clause} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(company_id)
    .bind(entity)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM activity_logs WHERE {clause}"))
            .bind(company_id)
            .bind(entity)
            .fetch_one(pool)
            .await?;

    Ok((rows, total as u64))
}
