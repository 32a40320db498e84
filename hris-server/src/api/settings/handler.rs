//! System Settings API Handlers

use std::collections::HashMap;

use axum::{Json, extract::State};
use shared::models::SettingsUpdate;

use crate::activity;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::setting::SettingScope;
use crate::settings;
use crate::utils::AppResult;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<HashMap<String, String>>> {
    user.require_manager()?;
    Ok(Json(
        settings::get(&state.pool, SettingScope::System, user.company_id).await?,
    ))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<HashMap<String, String>>> {
    user.require_manager()?;
    let detail = serde_json::to_value(&payload).ok();
    let stored = settings::update(&state.pool, SettingScope::System, user.company_id, payload).await?;
    activity::record(&state.pool, &user, "update", "system_settings", None, detail).await;
    Ok(Json(stored))
}
