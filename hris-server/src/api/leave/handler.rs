//! Leave API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::models::{LeaveCreate, LeaveRequest, LeaveReview, LeaveStatus};
use shared::{PageQuery, Paginated};

use crate::activity;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::leave::LeaveFilter;
use crate::employees;
use crate::leave;
use crate::utils::AppResult;

const RESOURCE: &str = "leave";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<LeaveStatus>,
    /// Ignored for employees, who only see their own requests
    pub employee_id: Option<i64>,
}

/// GET /api/leave
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<LeaveRequest>>> {
    let employee_id = if user.is_manager() {
        query.employee_id
    } else {
        Some(employees::for_user(&state.pool, user.company_id, user.id).await?.id)
    };
    let filter = LeaveFilter {
        status: query.status,
        employee_id,
    };
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (rows, total) =
        leave::list(&state.pool, user.company_id, &filter, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}

/// POST /api/leave
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<LeaveCreate>,
) -> AppResult<Json<LeaveRequest>> {
    let employee = employees::for_user(&state.pool, user.company_id, user.id).await?;
    let request = leave::create(&state.pool, &employee, payload).await?;

    activity::record(
        &state.pool,
        &user,
        "create",
        RESOURCE,
        Some(request.id),
        Some(json!({
            "leave_type": request.leave_type,
            "start_date": request.start_date,
            "end_date": request.end_date,
        })),
    )
    .await;

    Ok(Json(request))
}

/// The review body is optional; a bare POST carries no note
fn review_note(payload: Option<Json<LeaveReview>>) -> Option<String> {
    payload.and_then(|Json(review)| review.note)
}

/// POST /api/leave/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    payload: Option<Json<LeaveReview>>,
) -> AppResult<Json<LeaveRequest>> {
    user.require_manager()?;
    let request = leave::approve(&state.pool, &user, id, review_note(payload)).await?;
    activity::record(&state.pool, &user, "approve", RESOURCE, Some(id), None).await;
    Ok(Json(request))
}

/// POST /api/leave/{id}/reject
pub async fn reject(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    payload: Option<Json<LeaveReview>>,
) -> AppResult<Json<LeaveRequest>> {
    user.require_manager()?;
    let request = leave::reject(&state.pool, &user, id, review_note(payload)).await?;
    activity::record(&state.pool, &user, "reject", RESOURCE, Some(id), None).await;
    Ok(Json(request))
}

/// POST /api/leave/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LeaveRequest>> {
    let employee = employees::for_user(&state.pool, user.company_id, user.id).await?;
    let request = leave::cancel(&state.pool, &employee, id).await?;
    activity::record(&state.pool, &user, "cancel", RESOURCE, Some(id), None).await;
    Ok(Json(request))
}
