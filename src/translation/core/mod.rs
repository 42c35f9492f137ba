//! 翻译系统核心模块
//!
//! 本模块把外部翻译服务、分片管道和任务存储组合成完整的异步翻译流程。
//!
//! ## 架构设计
//!
//! - **翻译服务** (`translator.rs`): 不透明的外部调用，文本进、译文出
//! - **翻译网关** (`gateway.rs`): 对单个片段调用翻译服务并清理结果
//! - **任务编排** (`orchestrator.rs`): 创建任务，后台按顺序处理分片并推送进度
//!
//! ## 模块依赖关系
//!
//! ```text
//! JobOrchestrator (orchestrator.rs)
//!     ├── Chunker (pipeline/chunker.rs)
//!     ├── TranslationGateway (gateway.rs)
//!     │       └── Translator (translator.rs)
//!     ├── JobStore (storage/job_store.rs)
//!     └── Notifier (realtime/notifier.rs)
//! ```

pub mod gateway;
pub mod orchestrator;
pub mod translator;

pub use gateway::{FragmentPosition, TranslationGateway};
pub use orchestrator::{JobOrchestrator, OrchestratorSettings, SubmitOutcome};
pub use translator::{OpenAiTranslator, Translator};
