//! Web 路由处理器

pub mod api;
pub mod ws;

pub use api::*;
pub use ws::*;
