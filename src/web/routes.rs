//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建路由结构
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/translate", post(translate_text))
        .route("/api/translation-status/:id", get(translation_status))
        .route("/api/import", get(import_article))
        .route("/api/health", get(health_check))
        // 推送通道
        .route("/ws", get(ws_handler))
}
