//! Activity Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::ActivityLog;
use shared::{PageQuery, Paginated};

use crate::activity;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// e.g. `payroll`, `leave`, `employee`
    pub entity: Option<String>,
}

/// GET /api/activity-log
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<ActivityLog>>> {
    user.require_manager()?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (rows, total) = activity::list(
        &state.pool,
        user.company_id,
        query.entity.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}
