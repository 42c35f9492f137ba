//! # 网络模块
//!
//! 文章导入用到的页面抓取：
//!
//! - `fetch` - 浏览器风格的 HTTP 请求、字符集识别、导入错误

pub mod fetch;

pub use fetch::{parse_content_type, validate_url, ArticleFetcher, ImportError};
