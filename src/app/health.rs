//! 健康检查

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use super::AppState;
use crate::core::error::CoreError;
use crate::infrastructure::DatabaseManager;

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, CoreError> {
    DatabaseManager::ping(&state.db)
        .await
        .map_err(|e| CoreError::InternalServerError(e.to_string()))?;

    Ok(Json(json!({
        "status": "healthy",
        "database": "connected",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
