//! Web 模块的数据类型定义

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::network::ArticleFetcher;
use crate::realtime::Notifier;
use crate::translation::{JobOrchestrator, JobStore};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: JobOrchestrator,
    pub notifier: Arc<Notifier>,
    pub store: Arc<JobStore>,
    pub fetcher: ArticleFetcher,
}

impl AppState {
    pub fn new(orchestrator: JobOrchestrator, fetcher: ArticleFetcher) -> Self {
        Self {
            notifier: Arc::clone(orchestrator.notifier()),
            store: Arc::clone(orchestrator.store()),
            orchestrator,
            fetcher,
        }
    }
}

/// 翻译请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// 推送通道客户端 id
    #[serde(default)]
    pub client_id: Option<String>,
}

/// 短文本直接翻译的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectTranslationResponse {
    pub translated_text: String,
}

/// 后台任务已创建的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreatedResponse {
    pub translation_id: String,
    pub status: &'static str,
    pub message: &'static str,
    pub total_chunks: usize,
    pub poll_url: String,
}

impl JobCreatedResponse {
    pub fn new(translation_id: String, total_chunks: usize) -> Self {
        Self {
            poll_url: format!("/api/translation-status/{}", translation_id),
            translation_id,
            status: "processing",
            message: "Translation started",
            total_chunks,
        }
    }
}

/// 导入请求参数
#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub url: Option<String>,
}

/// 导入响应
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub content: String,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}
