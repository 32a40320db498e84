//! Employee records (HR fields plus the linked user account)

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate};
use sqlx::SqlitePool;

use crate::db::repository::{Page, RepoError, employee as repo};
use crate::payroll::TaxStatus;
use crate::utils::time;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text, validate_salary,
};

/// Canonical `TK/n` / `K/n` form
fn normalize_tax_status(value: &str) -> AppResult<String> {
    value
        .parse::<TaxStatus>()
        .map(|s| s.to_string())
        .map_err(|e| AppError::with_message(ErrorCode::InvalidTaxStatus, e))
}

/// Both the pre-check and the `(company_id, employee_number)` unique key
/// mention the column; everything else unique on create is the email
fn duplicate_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("employee_number") => {
            AppError::with_message(ErrorCode::EmployeeNumberExists, msg)
        }
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::EmployeeEmailExists, msg),
        other => other.into(),
    }
}

pub async fn create(pool: &SqlitePool, company_id: i64, mut data: EmployeeCreate) -> AppResult<Employee> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_email(data.email.trim())?;
    validate_required_text(&data.employee_number, "employee_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.department, "department", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.position, "position", MAX_SHORT_TEXT_LEN)?;
    validate_salary(data.base_salary)?;
    data.tax_status = normalize_tax_status(&data.tax_status)?;
    if let Some(join_date) = &data.join_date {
        time::parse_date(join_date)?;
    }

    let employee = repo::create(pool, company_id, data).await.map_err(duplicate_error)?;
    tracing::info!(company_id, employee_id = employee.id, "Employee created");
    Ok(employee)
}

pub async fn update(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
    mut data: EmployeeUpdate,
) -> AppResult<Employee> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.department, "department", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.position, "position", MAX_SHORT_TEXT_LEN)?;
    if let Some(salary) = data.base_salary {
        validate_salary(salary)?;
    }
    if let Some(status) = &data.tax_status {
        data.tax_status = Some(normalize_tax_status(status)?);
    }

    repo::update(pool, company_id, id, data).await.map_err(|e| match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::EmployeeNotFound).with_detail("id", id),
        other => other.into(),
    })
}

pub async fn get(pool: &SqlitePool, company_id: i64, id: i64) -> AppResult<Employee> {
    repo::find_by_id(pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound).with_detail("id", id))
}

/// The employee profile of the calling user
pub async fn for_user(pool: &SqlitePool, company_id: i64, user_id: i64) -> AppResult<Employee> {
    repo::find_by_user(pool, company_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::EmployeeNotFound, "No employee profile for this user")
        })
}

pub async fn list(
    pool: &SqlitePool,
    company_id: i64,
    search: Option<&str>,
    limit: u32,
    offset: i64,
) -> AppResult<Page<Employee>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    Ok(repo::find_page(pool, company_id, search, limit, offset).await?)
}
