//! Payroll API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::models::{Payroll, PayrollGenerate, PayrollRunSummary, SettingsUpdate};
use shared::{PageQuery, Paginated};

use crate::activity;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::payroll::PayrollFilter;
use crate::db::repository::setting::SettingScope;
use crate::employees;
use crate::payroll::service;
use crate::settings;
use crate::utils::AppResult;

const RESOURCE: &str = "payroll";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub employee_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageOnly {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// POST /api/payroll/generate
pub async fn generate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PayrollGenerate>,
) -> AppResult<Json<PayrollRunSummary>> {
    user.require_manager()?;
    let summary = service::generate(&state.pool, user.company_id, payload.month, payload.year).await?;

    activity::record(
        &state.pool,
        &user,
        "generate",
        RESOURCE,
        None,
        serde_json::to_value(&summary).ok(),
    )
    .await;

    Ok(Json(summary))
}

/// GET /api/payroll
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Payroll>>> {
    user.require_manager()?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let filter = PayrollFilter {
        month: query.month,
        year: query.year,
        employee_id: query.employee_id,
        exclude_draft: false,
    };
    let (rows, total) =
        service::list(&state.pool, user.company_id, filter, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}

/// GET /api/payroll/me - the caller's finalized and paid payslips
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<PageOnly>,
) -> AppResult<Json<Paginated<Payroll>>> {
    let employee = employees::for_user(&state.pool, user.company_id, user.id).await?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (rows, total) = service::list_for_employee(
        &state.pool,
        user.company_id,
        employee.id,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}

/// GET /api/payroll/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Payroll>> {
    user.require_manager()?;
    Ok(Json(service::get(&state.pool, user.company_id, id).await?))
}

/// POST /api/payroll/{id}/finalize
pub async fn finalize(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Payroll>> {
    user.require_manager()?;
    let payroll = service::finalize(&state.pool, user.company_id, id).await?;
    activity::record(&state.pool, &user, "finalize", RESOURCE, Some(id), None).await;
    Ok(Json(payroll))
}

/// POST /api/payroll/{id}/pay
pub async fn mark_paid(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Payroll>> {
    user.require_manager()?;
    let payroll = service::mark_paid(&state.pool, user.company_id, id).await?;
    activity::record(
        &state.pool,
        &user,
        "pay",
        RESOURCE,
        Some(id),
        Some(json!({ "net_salary": payroll.net_salary })),
    )
    .await;
    Ok(Json(payroll))
}

/// GET /api/payroll/settings
pub async fn get_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<HashMap<String, String>>> {
    user.require_manager()?;
    Ok(Json(
        settings::get(&state.pool, SettingScope::Payroll, user.company_id).await?,
    ))
}

/// PUT /api/payroll/settings
pub async fn update_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<HashMap<String, String>>> {
    user.require_manager()?;
    let keys: Vec<String> = payload.keys().cloned().collect();
    let stored = settings::update(&state.pool, SettingScope::Payroll, user.company_id, payload).await?;
    activity::record(
        &state.pool,
        &user,
        "update",
        "payroll_settings",
        None,
        Some(json!({ "keys": keys })),
    )
    .await;
    Ok(Json(stored))
}
