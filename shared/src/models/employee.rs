//! Employee Model

use serde::{Deserialize, Serialize};

/// Employee row joined with its user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub company_id: i64,
    pub user_id: i64,
    pub employee_number: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
    /// Monthly base salary
    pub base_salary: f64,
    /// PTKP status code, e.g. `TK/0`, `K/2`
    pub tax_status: String,
    /// Whether the employee has a registered NPWP (tax id)
    pub has_npwp: bool,
    pub is_active: bool,
    /// Join date (YYYY-MM-DD)
    pub join_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload (creates the user account too)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreate {
    pub name: String,
    pub email: String,
    pub employee_number: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub base_salary: f64,
    #[serde(default = "default_tax_status")]
    pub tax_status: String,
    #[serde(default)]
    pub has_npwp: bool,
    pub join_date: Option<String>,
}

fn default_tax_status() -> String {
    "TK/0".to_string()
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub base_salary: Option<f64>,
    pub tax_status: Option<String>,
    pub has_npwp: Option<bool>,
    pub is_active: Option<bool>,
}
