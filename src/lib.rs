//! # Parallel Reader
//!
//! 对照阅读翻译服务：长文档被切成 HTML 安全的分片，在后台逐片翻译，
//! 客户端通过轮询或推送通道获取进度。
//!
//! ## 模块组织
//!
//! - `translation` - 分片、翻译网关、任务存储和任务编排
//! - `realtime` - 推送通道事件与客户端注册表
//! - `parsers` - HTML 解析与正文提取
//! - `network` - 文章抓取
//! - `env` - 类型安全的环境变量
//! - `web` - Web 服务器功能（可选）

pub mod env;
pub mod network;
pub mod parsers;
pub mod realtime;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use network::{ArticleFetcher, ImportError};
pub use parsers::extract_article;
pub use realtime::Notifier;
pub use translation::{
    create_orchestrator, create_orchestrator_with, JobOrchestrator, JobStore, SubmitOutcome,
    TranslationConfig, TranslationError, TranslationResult, Translator,
};
