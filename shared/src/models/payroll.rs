//! Payroll Model

use serde::{Deserialize, Serialize};

/// Payroll lifecycle: only DRAFT rows are recomputed by generation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PayrollStatus {
    Draft,
    Finalized,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Finalized => "FINALIZED",
            Self::Paid => "PAID",
        }
    }
}

/// One payslip per employee per period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payroll {
    pub id: i64,
    pub company_id: i64,
    pub employee_id: i64,
    pub period_month: i64,
    pub period_year: i64,
    pub base_salary: f64,
    pub tax_status: String,
    pub has_npwp: bool,
    pub bpjs_kesehatan_employee: f64,
    pub bpjs_jht_employee: f64,
    pub bpjs_jp_employee: f64,
    pub bpjs_employee_total: f64,
    pub bpjs_company_total: f64,
    pub biaya_jabatan: f64,
    pub ptkp_annual: f64,
    pub pkp_annual: f64,
    pub pph21_annual: f64,
    pub pph21_monthly: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    pub finalized_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Generate payroll payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollGenerate {
    pub month: u32,
    pub year: i32,
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRunSummary {
    pub month: u32,
    pub year: i32,
    /// New DRAFT rows
    pub created: u32,
    /// Existing DRAFT rows recomputed
    pub updated: u32,
    /// FINALIZED/PAID rows left untouched
    pub skipped: u32,
}
