//! Employee Repository
//!
//! Employees are stored across two tables: `users` (account, name, email)
//! and `employees` (HR fields). Reads join them.

use super::{Page, RepoError, RepoResult};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate, Role};
use sqlx::{Executor, Sqlite, SqlitePool};

const EMPLOYEE_SELECT: &str = "SELECT e.id, e.company_id, e.user_id, e.employee_number, u.name, u.email, e.department, e.position, e.base_salary, e.tax_status, e.has_npwp, e.is_active, e.join_date, e.created_at, e.updated_at FROM employees e JOIN users u ON u.id = e.user_id";

pub async fn find_by_id(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(&format!(
        "{EMPLOYEE_SELECT} WHERE e.company_id = ? AND e.id = ?"
    ))
    .bind(company_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

/// The employee profile linked to a user account
pub async fn find_by_user(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(&format!(
        "{EMPLOYEE_SELECT} WHERE e.company_id = ? AND e.user_id = ?"
    ))
    .bind(company_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

/// Active employees of a company, usable inside a transaction
pub async fn find_active<'c, E>(executor: E, company_id: i64) -> RepoResult<Vec<Employee>>
where
    E: Executor<'c, Database = Sqlite>,
{
    let employees = sqlx::query_as::<_, Employee>(&format!(
        "{EMPLOYEE_SELECT} WHERE e.company_id = ? AND e.is_active = 1 ORDER BY e.id"
    ))
    .bind(company_id)
    .fetch_all(executor)
    .await?;
    Ok(employees)
}

/// Paginated listing with an optional name/email/number search
pub async fn find_page(
    pool: &SqlitePool,
    company_id: i64,
    search: Option<&str>,
    limit: u32,
    offset: i64,
) -> RepoResult<Page<Employee>> {
    let pattern = search.map(|s| format!("%{}%", s.trim()));
    let filter = "e.company_id = ?1 AND (?2 IS NULL OR u.name LIKE ?2 OR u.email LIKE ?2 OR e.employee_number LIKE ?2)";

    let rows = sqlx::query_as::<_, Employee>(&format!(
        "{EMPLOYEE_SELECT} WHERE {filter} ORDER BY u.name LIMIT ?3 OFFSET ?4"
    ))
    .bind(company_id)
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM employees e JOIN users u ON u.id = e.user_id WHERE {filter}"
    ))
    .bind(company_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((rows, total as u64))
}

/// Create the user account and the employee row atomically
pub async fn create(
    pool: &SqlitePool,
    company_id: i64,
    data: EmployeeCreate,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let user_id = shared::util::snowflake_id();
    let employee_id = shared::util::snowflake_id();
    let email = data.email.trim().to_lowercase();

    let mut tx = pool.begin().await?;

    let taken: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE company_id = ? AND email = ?")
            .bind(company_id)
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;
    if taken.is_some() {
        return Err(RepoError::Duplicate(format!("Email {email} is already registered")));
    }

    let employee_number = data.employee_number.trim();
    let number_taken: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM employees WHERE company_id = ? AND employee_number = ?",
    )
    .bind(company_id)
    .bind(employee_number)
    .fetch_optional(&mut *tx)
    .await?;
    if number_taken.is_some() {
        return Err(RepoError::Duplicate(format!(
            "employee_number {employee_number} is already in use"
        )));
    }

    sqlx::query(
        "INSERT INTO users (id, company_id, email, name, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(company_id)
    .bind(&email)
    .bind(data.name.trim())
    .bind(Role::Employee)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO employees (id, company_id, user_id, employee_number, department, position, base_salary, tax_status, has_npwp, is_active, join_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?11, ?11)",
    )
    .bind(employee_id)
    .bind(company_id)
    .bind(user_id)
    .bind(employee_number)
    .bind(&data.department)
    .bind(&data.position)
    .bind(data.base_salary)
    .bind(&data.tax_status)
    .bind(data.has_npwp)
    .bind(&data.join_date)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, company_id, employee_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

pub async fn update(
    pool: &SqlitePool,
    company_id: i64,
    id: i64,
    data: EmployeeUpdate,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE employees SET department = COALESCE(?1, department), position = COALESCE(?2, position), base_salary = COALESCE(?3, base_salary), tax_status = COALESCE(?4, tax_status), has_npwp = COALESCE(?5, has_npwp), is_active = COALESCE(?6, is_active), updated_at = ?7 WHERE id = ?8 AND company_id = ?9",
    )
    .bind(&data.department)
    .bind(&data.position)
    .bind(data.base_salary)
    .bind(&data.tax_status)
    .bind(data.has_npwp)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .bind(company_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }

    if let Some(name) = &data.name {
        sqlx::query(
            "UPDATE users SET name = ? WHERE id = (SELECT user_id FROM employees WHERE id = ? AND company_id = ?)",
        )
        .bind(name.trim())
        .bind(id)
        .bind(company_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, company_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}
