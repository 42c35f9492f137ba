//! 任务状态查询处理器

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;

use super::ApiError;
use crate::translation::JobSnapshot;
use crate::web::types::AppState;

/// 查询翻译任务快照
pub async fn translation_status(
    State(state): State<Arc<AppState>>,
    Path(translation_id): Path<String>,
) -> Result<Json<JobSnapshot>, ApiError> {
    match state.orchestrator.status(&translation_id) {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(_) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": "not_found",
                "message": "Translation not found"
            })),
        )),
    }
}
