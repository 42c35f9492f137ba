//! 文章导入处理器

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};

use super::{error_body, import_error_response, ApiError};
use crate::web::types::{AppState, ImportQuery, ImportResponse};

/// 抓取页面并提取正文
pub async fn import_article(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
) -> Result<Json<ImportResponse>, ApiError> {
    let url = match query.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(error_body(StatusCode::BAD_REQUEST, "URL is required")),
    };

    let content = state.fetcher.fetch_article(&url).await.map_err(|e| {
        tracing::warn!("文章导入失败 {}: {}", url, e);
        import_error_response(e)
    })?;

    Ok(Json(ImportResponse { content }))
}
