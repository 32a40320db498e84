//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::Notification;
use shared::{PageQuery, Paginated};

use crate::api::UpdatedCount;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::notifications;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Notification>>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (rows, total) = notifications::list(
        &state.pool,
        user.company_id,
        user.id,
        query.unread_only,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(Paginated::from_query(rows, total, &page)))
}

/// POST /api/notifications/{id}/read
pub async fn read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    notifications::mark_read(&state.pool, user.company_id, user.id, id).await?;
    Ok(Json(true))
}

/// POST /api/notifications/read-all
pub async fn read_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UpdatedCount>> {
    let updated = notifications::mark_all_read(&state.pool, user.company_id, user.id).await?;
    Ok(Json(UpdatedCount { updated }))
}
