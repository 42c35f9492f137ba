//! 翻译提交处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{error_body, translation_error_response, ApiError};
use crate::translation::SubmitOutcome;
use crate::web::types::{AppState, DirectTranslationResponse, JobCreatedResponse, TranslateRequest};

/// 提交翻译
///
/// 短文本直接返回译文；长文本创建后台任务并返回轮询地址。
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<TranslateRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = match request.text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(error_body(StatusCode::BAD_REQUEST, "Text is required")),
    };

    let client_id = request.client_id.filter(|id| !id.is_empty());

    if let Some(ref id) = client_id {
        if !state.notifier.is_connected(id) {
            tracing::debug!("客户端 {} 未连接，任务事件只能通过轮询获取", id);
        }
    }

    let outcome = state
        .orchestrator
        .submit(&text, client_id)
        .await
        .map_err(|e| {
            tracing::error!("翻译请求失败: {}", e);
            translation_error_response(e)
        })?;

    let body = match outcome {
        SubmitOutcome::Direct { translated_text } => {
            serde_json::to_value(DirectTranslationResponse { translated_text })
        }
        SubmitOutcome::Job {
            translation_id,
            total_chunks,
        } => serde_json::to_value(JobCreatedResponse::new(translation_id, total_chunks)),
    };

    body.map(Json).map_err(|e| {
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("响应序列化失败: {}", e),
        )
    })
}
