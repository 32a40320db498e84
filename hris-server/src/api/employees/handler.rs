//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate};
use shared::{PageQuery, Paginated};

use crate::activity;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::employees;
use crate::utils::AppResult;

const RESOURCE: &str = "employee";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Matches name, email or employee number
    pub search: Option<String>,
}

/// GET /api/employees
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Employee>>> {
    user.require_manager()?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (rows, total) = employees::list(
        &state.pool,
        user.company_id,
        query.search.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    user.require_manager()?;
    Ok(Json(employees::get(&state.pool, user.company_id, id).await?))
}

/// POST /api/employees
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    user.require_manager()?;
    let employee = employees::create(&state.pool, user.company_id, payload).await?;

    activity::record(
        &state.pool,
        &user,
        "create",
        RESOURCE,
        Some(employee.id),
        Some(json!({ "email": employee.email, "employee_number": employee.employee_number })),
    )
    .await;

    Ok(Json(employee))
}

/// PUT /api/employees/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    user.require_manager()?;
    let changes = serde_json::to_value(&payload).ok();
    let employee = employees::update(&state.pool, user.company_id, id, payload).await?;

    activity::record(&state.pool, &user, "update", RESOURCE, Some(id), changes).await;

    Ok(Json(employee))
}
