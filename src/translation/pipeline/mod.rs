//! 翻译管道模块
//!
//! 提供文档分片、译文清理和重组

pub mod chunker;
pub mod cleaner;

// 重新导出主要类型
pub use chunker::{chunk_document, Chunker};
pub use cleaner::{clean, reassemble};
