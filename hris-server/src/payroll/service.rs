//! Payroll generation and status lifecycle
//!
//! ```text
//! generate ──► DRAFT ──finalize──► FINALIZED ──pay──► PAID
//!               ▲  │
//!               └──┘ re-run overwrites
//! ```

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{NotificationKind, Payroll, PayrollRunSummary, PayrollStatus};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::tax::{TaxStatus, calculate};
use crate::db::repository::payroll::{self as repo, PayrollDraft, PayrollFilter};
use crate::db::repository::{Page, RepoError, employee};
use crate::notifications;
use crate::settings;

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

fn validate_period(month: u32, year: i32) -> AppResult<()> {
    if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::new(ErrorCode::PayrollInvalidPeriod)
            .with_detail("month", month)
            .with_detail("year", year));
    }
    Ok(())
}

/// Compute payroll for every active employee of the company for one period.
///
/// Runs in a single transaction: a new period row is inserted as DRAFT, an
/// existing DRAFT row is overwritten, FINALIZED and PAID rows are skipped.
/// Running it again with unchanged inputs converges to the same rows.
pub async fn generate(
    pool: &SqlitePool,
    company_id: i64,
    month: u32,
    year: i32,
) -> AppResult<PayrollRunSummary> {
    validate_period(month, year)?;
    let rates = settings::load_payroll_rates(pool, company_id).await?;

    let mut summary = PayrollRunSummary {
        month,
        year,
        ..Default::default()
    };

    let mut tx = pool.begin().await.map_err(RepoError::from)?;
    let employees = employee::find_active(&mut *tx, company_id).await?;

    for emp in &employees {
        let status: TaxStatus = emp.tax_status.parse().map_err(|_| {
            AppError::new(ErrorCode::InvalidTaxStatus)
                .with_detail("employee_id", emp.id)
                .with_detail("tax_status", emp.tax_status.clone())
        })?;
        let breakdown = calculate(emp.base_salary, status, emp.has_npwp, &rates);
        let tax_status = status.to_string();
        let draft = PayrollDraft {
            company_id,
            employee_id: emp.id,
            month,
            year,
            tax_status: &tax_status,
            has_npwp: emp.has_npwp,
            breakdown: &breakdown,
        };

        match repo::find_period_status(&mut *tx, emp.id, month, year).await? {
            None => {
                repo::insert_draft(&mut *tx, &draft).await?;
                summary.created += 1;
            }
            Some((id, PayrollStatus::Draft)) => {
                repo::update_draft(&mut *tx, id, &draft).await?;
                summary.updated += 1;
            }
            Some(_) => summary.skipped += 1,
        }
    }

    tx.commit().await.map_err(RepoError::from)?;

    info!(
        company_id,
        period = %format!("{year}-{month:02}"),
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "Payroll generated"
    );
    Ok(summary)
}

pub async fn get(pool: &SqlitePool, company_id: i64, id: i64) -> AppResult<Payroll> {
    repo::find_by_id(pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayrollNotFound).with_detail("id", id))
}

/// Distinguish "no such payroll" from "wrong status" after a guarded update
async fn transition_error(pool: &SqlitePool, company_id: i64, id: i64, to: PayrollStatus) -> AppError {
    match get(pool, company_id, id).await {
        Ok(current) => AppError::new(ErrorCode::PayrollInvalidStatus)
            .with_detail("status", current.status.as_str())
            .with_detail("target", to.as_str()),
        Err(e) => e,
    }
}

/// Notify the employee owning a payroll row
async fn notify_employee(pool: &SqlitePool, payroll: &Payroll, title: &str, message: &str) {
    match employee::find_by_id(pool, payroll.company_id, payroll.employee_id).await {
        Ok(Some(emp)) => {
            notifications::notify(
                pool,
                payroll.company_id,
                emp.user_id,
                NotificationKind::Payroll,
                title,
                message,
            )
            .await
        }
        Ok(None) => warn!(payroll_id = payroll.id, "Payroll employee no longer exists"),
        Err(e) => warn!(payroll_id = payroll.id, "Failed to look up payroll employee: {e}"),
    }
}

/// `DRAFT → FINALIZED`
pub async fn finalize(pool: &SqlitePool, company_id: i64, id: i64) -> AppResult<Payroll> {
    if repo::finalize(pool, company_id, id).await? == 0 {
        return Err(transition_error(pool, company_id, id, PayrollStatus::Finalized).await);
    }
    let payroll = get(pool, company_id, id).await?;
    info!(company_id, payroll_id = id, "Payroll finalized");

    let message = format!(
        "Your payslip for {:02}/{} is ready. Net salary: {:.0}",
        payroll.period_month, payroll.period_year, payroll.net_salary
    );
    notify_employee(pool, &payroll, "Payslip ready", &message).await;
    Ok(payroll)
}

/// `FINALIZED → PAID`
pub async fn mark_paid(pool: &SqlitePool, company_id: i64, id: i64) -> AppResult<Payroll> {
    if repo::mark_paid(pool, company_id, id).await? == 0 {
        return Err(transition_error(pool, company_id, id, PayrollStatus::Paid).await);
    }
    let payroll = get(pool, company_id, id).await?;
    info!(company_id, payroll_id = id, "Payroll paid");

    let message = format!(
        "Salary for {:02}/{} has been paid",
        payroll.period_month, payroll.period_year
    );
    notify_employee(pool, &payroll, "Salary paid", &message).await;
    Ok(payroll)
}

pub async fn list(
    pool: &SqlitePool,
    company_id: i64,
    filter: PayrollFilter,
    limit: u32,
    offset: i64,
) -> AppResult<Page<Payroll>> {
    if let Some(month) = filter.month {
        validate_period(month, filter.year.unwrap_or(MIN_YEAR))?;
    } else if let Some(year) = filter.year {
        validate_period(1, year)?;
    }
    Ok(repo::find_page(pool, company_id, filter, limit, offset).await?)
}

/// An employee's own payslips; drafts stay hidden until finalized
pub async fn list_for_employee(
    pool: &SqlitePool,
    company_id: i64,
    employee_id: i64,
    limit: u32,
    offset: i64,
) -> AppResult<Page<Payroll>> {
    let filter = PayrollFilter {
        employee_id: Some(employee_id),
        exclude_draft: true,
        ..Default::default()
    };
    Ok(repo::find_page(pool, company_id, filter, limit, offset).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::setting::{SettingScope, upsert_many};
    use crate::db::repository::test_support::{seed_employee, test_pool};
    use crate::payroll::rates::KEY_JHT_EMPLOYEE_RATE;
    use shared::models::EmployeeUpdate;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_generate_creates_drafts() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        seed_employee(&pool, 2, "other@example.com").await;

        let summary = generate(&pool, 1, 3, 2024).await.unwrap();
        assert_eq!(
            summary,
            PayrollRunSummary {
                month: 3,
                year: 2024,
                created: 1,
                updated: 0,
                skipped: 0,
            }
        );

        let (rows, total) = list(&pool, 1, PayrollFilter::default(), 20, 0).await.unwrap();
        assert_eq!(total, 1);
        let row = &rows[0];
        assert_eq!(row.employee_id, emp.id);
        assert_eq!(row.status, PayrollStatus::Draft);
        assert_eq!(row.tax_status, "TK/0");
        assert_eq!(row.pph21_monthly, 235_000.0);
        assert_eq!(row.net_salary, 9_365_000.0);
    }

    #[tokio::test]
    async fn test_generate_covers_large_company() {
        const HEADCOUNT: u32 = 3_000;
        let pool = test_pool().await;
        for i in 0..HEADCOUNT {
            seed_employee(&pool, 1, &format!("staff{i}@example.com")).await;
        }

        let summary = generate(&pool, 1, 3, 2024).await.unwrap();
        assert_eq!(summary.created, HEADCOUNT);

        let again = generate(&pool, 1, 3, 2024).await.unwrap();
        assert_eq!((again.created, again.updated), (0, HEADCOUNT));

        let (_, total) = list(&pool, 1, PayrollFilter::default(), 1, 0).await.unwrap();
        assert_eq!(total, u64::from(HEADCOUNT));
    }

    #[tokio::test]
    async fn test_rerun_converges_and_tracks_salary_changes() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;

        generate(&pool, 1, 3, 2024).await.unwrap();
        let first = list(&pool, 1, PayrollFilter::default(), 20, 0).await.unwrap().0;

        let again = generate(&pool, 1, 3, 2024).await.unwrap();
        assert_eq!((again.created, again.updated), (0, 1));
        let second = list(&pool, 1, PayrollFilter::default(), 20, 0).await.unwrap().0;
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].net_salary, second[0].net_salary);

        employee::update(
            &pool,
            1,
            emp.id,
            EmployeeUpdate {
                base_salary: Some(12_000_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        generate(&pool, 1, 3, 2024).await.unwrap();
        let third = get(&pool, 1, first[0].id).await.unwrap();
        assert_eq!(third.base_salary, 12_000_000.0);
    }

    #[tokio::test]
    async fn test_finalized_rows_are_not_touched() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        generate(&pool, 1, 3, 2024).await.unwrap();
        let (rows, _) = list(&pool, 1, PayrollFilter::default(), 20, 0).await.unwrap();
        let finalized = finalize(&pool, 1, rows[0].id).await.unwrap();
        assert_eq!(finalized.status, PayrollStatus::Finalized);
        assert!(finalized.finalized_at.is_some());

        let mut values = HashMap::new();
        values.insert(KEY_JHT_EMPLOYEE_RATE.to_string(), "0.05".to_string());
        upsert_many(&pool, SettingScope::Payroll, 1, &values).await.unwrap();

        let summary = generate(&pool, 1, 3, 2024).await.unwrap();
        assert_eq!(summary.skipped, 1);
        let after = get(&pool, 1, finalized.id).await.unwrap();
        assert_eq!(after.bpjs_jht_employee, finalized.bpjs_jht_employee);
        assert_eq!(after.updated_at, finalized.updated_at);

        // A new period picks up the changed rate
        generate(&pool, 1, 4, 2024).await.unwrap();
        let filter = PayrollFilter {
            month: Some(4),
            year: Some(2024),
            employee_id: Some(emp.id),
            ..Default::default()
        };
        let april = list(&pool, 1, filter, 20, 0).await.unwrap().0;
        assert_eq!(april[0].bpjs_jht_employee, 500_000.0);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        generate(&pool, 1, 3, 2024).await.unwrap();
        let id = list(&pool, 1, PayrollFilter::default(), 20, 0).await.unwrap().0[0].id;

        let err = mark_paid(&pool, 1, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PayrollInvalidStatus);

        finalize(&pool, 1, id).await.unwrap();
        let err = finalize(&pool, 1, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PayrollInvalidStatus);

        let paid = mark_paid(&pool, 1, id).await.unwrap();
        assert_eq!(paid.status, PayrollStatus::Paid);
        assert!(paid.paid_at.is_some());

        // Other tenants cannot see or move it
        let err = finalize(&pool, 2, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PayrollNotFound);

        let (notes, total) = notifications::list(&pool, 1, emp.user_id, false, 20, 0)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(notes.iter().all(|n| n.kind == NotificationKind::Payroll));
    }

    #[tokio::test]
    async fn test_employee_sees_only_released_payslips() {
        let pool = test_pool().await;
        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        generate(&pool, 1, 3, 2024).await.unwrap();
        generate(&pool, 1, 4, 2024).await.unwrap();

        assert_eq!(list_for_employee(&pool, 1, emp.id, 20, 0).await.unwrap().1, 0);

        let march = PayrollFilter {
            month: Some(3),
            year: Some(2024),
            ..Default::default()
        };
        let id = list(&pool, 1, march, 20, 0).await.unwrap().0[0].id;
        finalize(&pool, 1, id).await.unwrap();

        let (rows, total) = list_for_employee(&pool, 1, emp.id, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].period_month, 3);
    }

    #[tokio::test]
    async fn test_invalid_period_and_tax_status() {
        let pool = test_pool().await;
        let err = generate(&pool, 1, 13, 2024).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PayrollInvalidPeriod);
        let err = generate(&pool, 1, 0, 2024).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PayrollInvalidPeriod);

        let emp = seed_employee(&pool, 1, "budi@example.com").await;
        sqlx::query("UPDATE employees SET tax_status = 'X/9' WHERE id = ?")
            .bind(emp.id)
            .execute(&pool)
            .await
            .unwrap();
        let err = generate(&pool, 1, 3, 2024).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTaxStatus);
        assert_eq!(list(&pool, 1, PayrollFilter::default(), 20, 0).await.unwrap().1, 0);
    }

    #[tokio::test]
    async fn test_empty_company_generates_nothing() {
        let pool = test_pool().await;
        let summary = generate(&pool, 9, 1, 2025).await.unwrap();
        assert_eq!((summary.created, summary.updated, summary.skipped), (0, 0, 0));
    }
}
