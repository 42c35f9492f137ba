//! HTML解析和处理模块
//!
//! - `dom`: DOM 构建、查找和删除
//! - `serializer`: 节点序列化
//! - `extract`: 正文提取

pub mod dom;
pub mod extract;
pub mod serializer;

pub use dom::{
    collect_outermost, find_first, get_node_attr, get_node_name, has_class, html_to_dom,
    parse_html, remove_elements,
};
pub use extract::{extract_article, extract_article_from_bytes};
pub use serializer::{serialize_inner, serialize_outer};
