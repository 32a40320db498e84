//! Attendance API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::models::{Attendance, CheckInRequest, CheckOutRequest, SweepResult};
use shared::util::now_millis;
use shared::{PageQuery, Paginated};

use crate::activity;
use crate::attendance::service;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::attendance::AttendanceFilter;
use crate::employees;
use crate::settings::{self, AttendancePolicy};
use crate::utils::AppResult;

const RESOURCE: &str = "attendance";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Ignored for employees, who only see their own records
    pub employee_id: Option<i64>,
    /// Inclusive `YYYY-MM-DD`
    pub from: Option<String>,
    pub to: Option<String>,
}

async fn policy(state: &ServerState, company_id: i64) -> AppResult<AttendancePolicy> {
    settings::load_policy(&state.pool, company_id, state.config.default_timezone).await
}

/// POST /api/attendance/check-in
pub async fn check_in(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<Attendance>> {
    let employee = employees::for_user(&state.pool, user.company_id, user.id).await?;
    let policy = policy(&state, user.company_id).await?;

    let record = service::check_in(
        &state.pool,
        &policy,
        &employee,
        payload.latitude,
        payload.longitude,
        now_millis(),
    )
    .await?;

    activity::record(
        &state.pool,
        &user,
        "check_in",
        RESOURCE,
        Some(record.id),
        Some(json!({ "status": record.status, "distance_m": record.distance_m })),
    )
    .await;

    Ok(Json(record))
}

/// POST /api/attendance/check-out
pub async fn check_out(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CheckOutRequest>,
) -> AppResult<Json<Attendance>> {
    let employee = employees::for_user(&state.pool, user.company_id, user.id).await?;
    let policy = policy(&state, user.company_id).await?;

    let record = service::check_out(
        &state.pool,
        &policy,
        &employee,
        payload.latitude,
        payload.longitude,
        now_millis(),
    )
    .await?;

    activity::record(&state.pool, &user, "check_out", RESOURCE, Some(record.id), None).await;

    Ok(Json(record))
}

/// GET /api/attendance/today
pub async fn today(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Option<Attendance>>> {
    let employee = employees::for_user(&state.pool, user.company_id, user.id).await?;
    let policy = policy(&state, user.company_id).await?;
    let record = service::today(&state.pool, &policy, &employee, now_millis()).await?;
    Ok(Json(record))
}

/// GET /api/attendance - all records for managers, own records otherwise
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Attendance>>> {
    let employee_id = if user.is_manager() {
        query.employee_id
    } else {
        Some(employees::for_user(&state.pool, user.company_id, user.id).await?.id)
    };
    let filter = AttendanceFilter {
        employee_id,
        from: query.from,
        to: query.to,
    };
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let policy = policy(&state, user.company_id).await?;

    let (rows, total) = service::list(
        &state.pool,
        user.company_id,
        &policy,
        &filter,
        page.limit(),
        page.offset(),
        now_millis(),
    )
    .await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}

/// POST /api/attendance/sweep - run the auto-checkout sweep now
pub async fn sweep(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<SweepResult>> {
    user.require_manager()?;
    let policy = policy(&state, user.company_id).await?;
    let closed = service::sweep_auto_checkout(&state.pool, user.company_id, &policy, now_millis()).await?;
    Ok(Json(SweepResult { closed }))
}
