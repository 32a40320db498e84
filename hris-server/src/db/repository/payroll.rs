//! Payroll Repository

use super::{Page, RepoResult};
use crate::payroll::PayrollBreakdown;
use shared::models::{Payroll, PayrollStatus};
use sqlx::{Executor, Sqlite, SqlitePool};

const PAYROLL_SELECT: &str = "SELECT id, company_id, employee_id, period_month, period_year, base_salary, tax_status, has_npwp, bpjs_kesehatan_employee, bpjs_jht_employee, bpjs_jp_employee, bpjs_employee_total, bpjs_company_total, biaya_jabatan, ptkp_annual, pkp_annual, pph21_annual, pph21_monthly, total_deductions, net_salary, status, finalized_at, paid_at, created_at, updated_at FROM payrolls";

/// Computed values for one employee and period
#[derive(Debug, Clone)]
pub struct PayrollDraft<'a> {
    pub company_id: i64,
    pub employee_id: i64,
    pub month: u32,
    pub year: i32,
    pub tax_status: &'a str,
    pub has_npwp: bool,
    pub breakdown: &'a PayrollBreakdown,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayrollFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub employee_id: Option<i64>,
    /// Hide DRAFT rows (payslips an employee may not see yet)
    pub exclude_draft: bool,
}

pub async fn find_by_id(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
) -> RepoResult<Option<Payroll>> {
    let row = sqlx::query_as::<_, Payroll>(&format!(
        "{PAYROLL_SELECT} WHERE company_id = ? AND id = ?"
    ))
    .bind(company_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// `(id, status)` of the employee's row for a period, if any
pub async fn find_period_status<'c, E>(
    executor: E,
    employee_id: i64,
    month: u32,
    year: i32,
) -> RepoResult<Option<(i64, PayrollStatus)>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, (i64, PayrollStatus)>(
        "SELECT id, status FROM payrolls WHERE employee_id = ? AND period_year = ? AND period_month = ?",
    )
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn insert_draft<'c, E>(executor: E, draft: &PayrollDraft<'_>) -> RepoResult<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let b = draft.breakdown;

    sqlx::query(
        "INSERT INTO payrolls (id, company_id, employee_id, period_month, period_year, base_salary, tax_status, has_npwp, bpjs_kesehatan_employee, bpjs_jht_employee, bpjs_jp_employee, bpjs_employee_total, bpjs_company_total, biaya_jabatan, ptkp_annual, pkp_annual, pph21_annual, pph21_monthly, total_deductions, net_salary, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, 'DRAFT', ?21, ?21)",
    )
    .bind(id)
    .bind(draft.company_id)
    .bind(draft.employee_id)
    .bind(draft.month)
    .bind(draft.year)
    .bind(b.base_salary)
    .bind(draft.tax_status)
    .bind(draft.has_npwp)
    .bind(b.bpjs_kesehatan_employee)
    .bind(b.bpjs_jht_employee)
    .bind(b.bpjs_jp_employee)
    .bind(b.bpjs_employee_total)
    .bind(b.bpjs_company_total)
    .bind(b.biaya_jabatan)
    .bind(b.ptkp_annual)
    .bind(b.pkp_annual)
    .bind(b.pph21_annual)
    .bind(b.pph21_monthly)
    .bind(b.total_deductions)
    .bind(b.net_salary)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(id)
}

/// Overwrite a DRAFT row. Returns rows changed: 0 when the row left DRAFT.
pub async fn update_draft<'c, E>(executor: E, id: i64, draft: &PayrollDraft<'_>) -> RepoResult<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    let now = shared::util::now_millis();
    let b = draft.breakdown;

    let rows = sqlx::query(
        "UPDATE payrolls SET base_salary = ?1, tax_status = ?2, has_npwp = ?3, bpjs_kesehatan_employee = ?4, bpjs_jht_employee = ?5, bpjs_jp_employee = ?6, bpjs_employee_total = ?7, bpjs_company_total = ?8, biaya_jabatan = ?9, ptkp_annual = ?10, pkp_annual = ?11, pph21_annual = ?12, pph21_monthly = ?13, total_deductions = ?14, net_salary = ?15, updated_at = ?16 WHERE id = ?17 AND status = 'DRAFT'",
    )
    .bind(b.base_salary)
    .bind(draft.tax_status)
    .bind(draft.has_npwp)
    .bind(b.bpjs_kesehatan_employee)
    .bind(b.bpjs_jht_employee)
    .bind(b.bpjs_jp_employee)
    .bind(b.bpjs_employee_total)
    .bind(b.bpjs_company_total)
    .bind(b.biaya_jabatan)
    .bind(b.ptkp_annual)
    .bind(b.pkp_annual)
    .bind(b.pph21_annual)
    .bind(b.pph21_monthly)
    .bind(b.total_deductions)
    .bind(b.net_salary)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(rows.rows_affected())
}

/// `DRAFT → FINALIZED`. Returns rows changed.
pub async fn finalize(pool: &SqlitePool, company_id: i64, id: i64) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE payrolls SET status = 'FINALIZED', finalized_at = ?1, updated_at = ?1 WHERE id = ?2 AND company_id = ?3 AND status = 'DRAFT'",
    )
    .bind(now)
    .bind(id)
    .bind(company_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// `FINALIZED → PAID`. Returns rows changed.
pub async fn mark_paid(pool: &SqlitePool, company_id: i64, id: i64) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE payrolls SET status = 'PAID', paid_at = ?1, updated_at = ?1 WHERE id = ?2 AND company_id = ?3 AND status = 'FINALIZED'",
    )
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
    filter: PayrollFilter,
    limit: u32,
    offset: i64,
) -> RepoResult<Page<Payroll>> {
    let clause = "company_id = ?1 AND (?2 IS NULL OR period_month = ?2) AND (?3 IS NULL OR period_year = ?3) AND (?4 IS NULL OR employee_id = ?4) AND (?5 = 0 OR status != 'DRAFT')";

    let rows = sqlx::query_as::<_, Payroll>(&format!(
        "{PAYROLL_SELECT} WHERE {clause} ORDER BY period_year DESC, period_month DESC, employee_id LIMIT ?6 OFFSET ?7"
    ))
    .bind(company_id)
    .bind(filter.month)
    .bind(filter.year)
    .bind(filter.employee_id)
    .bind(filter.exclude_draft)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM payrolls WHERE {clause}"))
        .bind(company_id)
        .bind(filter.month)
        .bind(filter.year)
        .bind(filter.employee_id)
        .bind(filter.exclude_draft)
        .fetch_one(pool)
        .await?;

    Ok((rows, total as u64))
}
