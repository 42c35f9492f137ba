//! 翻译模块
//!
//! 提供长文档的异步分片翻译，采用清晰的模块化架构：
//! - **core**: 翻译服务接口、翻译网关和任务编排
//! - **pipeline**: 文档分片、译文清理和重组
//! - **storage**: 进程内任务存储
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use parallel_reader::translation::{create_orchestrator, SubmitOutcome, TranslationConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslationConfig::default();
//! let orchestrator = create_orchestrator(&config)?;
//!
//! match orchestrator.submit("<p>Bonjour le monde</p>", None).await? {
//!     SubmitOutcome::Direct { translated_text } => println!("{}", translated_text),
//!     SubmitOutcome::Job { translation_id, .. } => println!("轮询 {}", translation_id),
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 处理翻译相关的所有配置
pub mod config;

/// 核心模块 - 翻译服务、网关和任务编排
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 文本处理管道模块 - 分片与清理
pub mod pipeline;

/// 存储管理模块 - 翻译任务存储
pub mod storage;

// ============================================================================
// 核心API导出
// ============================================================================

pub use config::{constants, load_translation_config, ConfigManager, TranslationConfig};
pub use core::{
    FragmentPosition, JobOrchestrator, OpenAiTranslator, OrchestratorSettings, SubmitOutcome,
    TranslationGateway, Translator,
};
pub use error::{ErrorSeverity, TranslationError, TranslationResult};
pub use pipeline::{chunk_document, clean, reassemble, Chunker};
pub use storage::{Clock, Job, JobSnapshot, JobStatus, JobStore, JobStoreError, SystemClock};

use crate::realtime::Notifier;

/// 用外部翻译服务组装编排器
pub fn create_orchestrator_with(
    config: &TranslationConfig,
    translator: Arc<dyn Translator>,
    store: Arc<JobStore>,
    notifier: Arc<Notifier>,
) -> JobOrchestrator {
    let gateway = TranslationGateway::new(translator, config.target_lang.clone());
    JobOrchestrator::new(store, gateway, notifier, OrchestratorSettings::from(config))
}

/// 使用 OpenAI 兼容服务和全新的存储组装编排器
pub fn create_orchestrator(config: &TranslationConfig) -> TranslationResult<JobOrchestrator> {
    config.validate()?;
    let translator = Arc::new(OpenAiTranslator::new(config)?);
    Ok(create_orchestrator_with(
        config,
        translator,
        Arc::new(JobStore::new()),
        Arc::new(Notifier::new()),
    ))
}
