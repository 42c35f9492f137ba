//! # 解析器模块
//!
//! 导入文章时使用的 HTML 解析、DOM 操作和正文提取。
//!
//! # 模块组织
//!
//! - `html` - HTML 文档解析、DOM 查找、序列化、正文提取

pub mod html;

pub use html::{extract_article, extract_article_from_bytes, html_to_dom};
