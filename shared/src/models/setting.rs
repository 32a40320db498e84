//! Company Settings Model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key/value setting row (system settings and payroll settings share the shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub company_id: i64,
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

/// Bulk update payload: `{ "office_radius_m": "150", ... }`
pub type SettingsUpdate = HashMap<String, String>;
