//! 推送通道
//!
//! 维护在线客户端，按客户端 id 推送任务状态变化事件。

pub mod events;
pub mod notifier;

pub use events::{
    ClientMessage, ControlMessage, ErrorEvent, Outbound, ServerEvent, TranslationComplete,
    TranslationStart, TranslationUpdate,
};
pub use notifier::Notifier;
