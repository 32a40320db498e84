//! Attendance Repository

use super::{Page, RepoError, RepoResult};
use shared::models::{Attendance, AttendanceStatus};
use sqlx::SqlitePool;

const ATTENDANCE_SELECT: &str = "SELECT id, company_id, employee_id, date, check_in, check_out, checkout_type, status, latitude, longitude, distance_m, checkout_latitude, checkout_longitude, work_minutes, created_at, updated_at FROM attendance";

/// Values for a new check-in row
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub company_id: i64,
    pub employee_id: i64,
    pub date: String,
    pub check_in: i64,
    pub status: AttendanceStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_m: Option<f64>,
}

/// Listing filters; dates are inclusive `YYYY-MM-DD`
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn find_by_id(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
) -> RepoResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, Attendance>(&format!(
        "{ATTENDANCE_SELECT} WHERE company_id = ? AND id = ?"
    ))
    .bind(company_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// The employee's record for one local calendar date
pub async fn find_by_employee_date(
    pool: &SqlitePool,
    employee_id: i64,
    date: &str,
) -> RepoResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, Attendance>(&format!(
        "{ATTENDANCE_SELECT} WHERE employee_id = ? AND date = ?"
    ))
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// All records of a company still waiting for a check-out
pub async fn find_open(pool: &SqlitePool, company_id: i64) -> RepoResult<Vec<Attendance>> {
    let rows = sqlx::query_as::<_, Attendance>(&format!(
        "{ATTENDANCE_SELECT} WHERE company_id = ? AND check_out IS NULL ORDER BY check_in"
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert a check-in; the `(employee_id, date)` unique key turns a racing
/// second check-in into [`RepoError::Duplicate`]
pub async fn insert(pool: &SqlitePool, data: NewCheckIn) -> RepoResult<Attendance> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO attendance (id, company_id, employee_id, date, check_in, status, latitude, longitude, distance_m, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(data.company_id)
    .bind(data.employee_id)
    .bind(&data.date)
    .bind(data.check_in)
    .bind(data.status)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(data.distance_m)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, data.company_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create attendance".into()))
}

/// Close an open record at `check_out` with type AUTO.
///
/// Returns the number of rows changed: 0 when another sweep got there first.
pub async fn close_auto(
    pool: &SqlitePool,
    id: i64,
    check_out: i64,
    work_minutes: i64,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE attendance SET check_out = ?1, checkout_type = 'AUTO', work_minutes = ?2, updated_at = ?3 WHERE id = ?4 AND check_out IS NULL",
    )
    .bind(check_out)
    .bind(work_minutes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Close an open record with type MANUAL
pub async fn close_manual(
    pool: &SqlitePool,
    id: i64,
    check_out: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
    work_minutes: i64,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE attendance SET check_out = ?1, checkout_type = 'MANUAL', checkout_latitude = ?2, checkout_longitude = ?3, work_minutes = ?4, updated_at = ?5 WHERE id = ?6 AND check_out IS NULL",
    )
    .bind(check_out)
    .bind(latitude)
    .bind(longitude)
    .bind(work_minutes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn find_page(
    pool: &SqlitePool,
    company_id: i64,
    filter: &AttendanceFilter,
    limit: u32,
    offset: i64,
) -> RepoResult<Page<Attendance>> {
    let clause = "company_id = ?1 AND (?2 IS NULL OR employee_id = ?2) AND (?3 IS NULL OR date >= ?3) AND (?4 IS NULL OR date <= ?4)";

    let rows = sqlx::query_as::<_, Attendance>(&format!(
        "{ATTENDANCE_SELECT} WHERE {clause} ORDER BY date DESC, check_in DESC LIMIT ?5 OFFSET ?6"
    ))
    .bind(company_id)
    .bind(filter.employee_id)
    .bind(&filter.from)
    .bind(&filter.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM attendance WHERE {clause}"))
        .bind(company_id)
        .bind(filter.employee_id)
        .bind(&filter.from)
        .bind(&filter.to)
        .fetch_one(pool)
        .await?;

    Ok((rows, total as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{seed_employee, test_pool};
    use shared::models::CheckoutType;

    fn check_in(company_id: i64, employee_id: i64, date: &str) -> NewCheckIn {
        NewCheckIn {
            company_id,
            employee_id,
            date: date.into(),
            check_in: 1_709_251_200_000,
            status: AttendanceStatus::Ontime,
            latitude: -6.2,
            longitude: 106.8,
            distance_m: Some(12.5),
        }
    }

    #[tokio::test]
    async fn test_second_insert_same_day_is_duplicate() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "a@example.com").await;

        insert(&pool, check_in(1, emp.id, "2024-03-01")).await.unwrap();
        let err = insert(&pool, check_in(1, emp.id, "2024-03-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        insert(&pool, check_in(1, emp.id, "2024-03-02")).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_only_touches_open_rows() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "a@example.com").await;
        let rec = insert(&pool, check_in(1, emp.id, "2024-03-01")).await.unwrap();

        assert_eq!(find_open(&pool, 1).await.unwrap().len(), 1);
        assert_eq!(close_auto(&pool, rec.id, 1_709_287_200_000, 600).await.unwrap(), 1);
        assert_eq!(close_auto(&pool, rec.id, 1_709_287_200_000, 600).await.unwrap(), 0);
        assert_eq!(
            close_manual(&pool, rec.id, 1_709_290_000_000, None, None, 640)
                .await
                .unwrap(),
            0
        );

        let closed = find_by_id(&pool, 1, rec.id).await.unwrap().unwrap();
        assert_eq!(closed.checkout_type, Some(CheckoutType::Auto));
        assert_eq!(closed.check_out, Some(1_709_287_200_000));
        assert!(find_open(&pool, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_page_filters() {
        let pool = test_pool().await;
        let a = seed_employee(&pool, 1, "a@example.com").await;
        let b = seed_employee(&pool, 1, "b@example.com").await;
        for date in ["2024-03-01", "2024-03-02", "2024-03-03"] {
            insert(&pool, check_in(1, a.id, date)).await.unwrap();
        }
        insert(&pool, check_in(1, b.id, "2024-03-02")).await.unwrap();

        let (_, total) = find_page(&pool, 1, &AttendanceFilter::default(), 20, 0)
            .await
            .unwrap();
        assert_eq!(total, 4);

        let filter = AttendanceFilter {
            employee_id: Some(a.id),
            from: Some("2024-03-02".into()),
            to: None,
        };
        let (rows, total) = find_page(&pool, 1, &filter, 20, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows[0].date, "2024-03-03");

        let (rows, total) = find_page(&pool, 1, &AttendanceFilter::default(), 1, 1)
            .await
            .unwrap();
        assert_eq!((rows.len(), total), (1, 4));
    }
}
