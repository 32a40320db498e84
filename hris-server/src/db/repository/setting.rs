//! Settings Repository
//!
//! `system_settings` and `payroll_settings` share the `(company_id, key) → value` shape.

use std::collections::HashMap;

use super::RepoResult;
use shared::models::Setting;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingScope {
    System,
    Payroll,
}

impl SettingScope {
    fn table(self) -> &'static str {
        match self {
            Self::System => "system_settings",
            Self::Payroll => "payroll_settings",
        }
    }
}

pub async fn find_all(
    pool: &SqlitePool,
    scope: SettingScope,
    company_id: i64,
) -> RepoResult<Vec<Setting>> {
    let rows = sqlx::query_as::<_, Setting>(&format!(
        "SELECT company_id, key, value, updated_at FROM {} WHERE company_id = ? ORDER BY key",
        scope.table()
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Settings as a `key → value` map
pub async fn load_map(
    pool: &SqlitePool,
    scope: SettingScope,
    company_id: i64,
) -> RepoResult<HashMap<String, String>> {
    Ok(find_all(pool, scope, company_id)
        .await?
        .into_iter()
        .map(|s| (s.key, s.value))
        .collect())
}

/// Upsert all pairs in one transaction
pub async fn upsert_many(
    pool: &SqlitePool,
    scope: SettingScope,
    company_id: i64,
    values: &HashMap<String, String>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO {} (company_id, key, value, updated_at) VALUES (?, ?, ?, ?) ON CONFLICT(company_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        scope.table()
    );

    let mut tx = pool.begin().await?;
    for (key, value) in values {
        sqlx::query(&sql)
            .bind(company_id)
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
