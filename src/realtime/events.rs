//! 推送通道消息
//!
//! 服务端事件序列化为 `{"type": ..., "data": {...}}`；
//! 连接确认和 pong 是扁平的控制消息。

use serde::{Deserialize, Serialize};

use crate::translation::storage::JobSnapshot;

/// 任务状态变化事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    TranslationStart(TranslationStart),
    TranslationUpdate(TranslationUpdate),
    TranslationComplete(TranslationComplete),
    Error(ErrorEvent),
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::TranslationStart(_) => "translation_start",
            ServerEvent::TranslationUpdate(_) => "translation_update",
            ServerEvent::TranslationComplete(_) => "translation_complete",
            ServerEvent::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStart {
    pub translation_id: String,
    pub total_chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUpdate {
    pub translation_id: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub text: String,
    /// 百分比
    pub progress: u8,
}

impl TranslationUpdate {
    /// 从任务快照生成，保证与轮询接口看到的内容一致
    pub fn from_snapshot(snapshot: &JobSnapshot, chunk_index: usize) -> Option<Self> {
        let text = snapshot.chunk_text(chunk_index)?;
        Some(Self {
            translation_id: snapshot.id.clone(),
            chunk_index,
            total_chunks: snapshot.progress.total,
            text: text.to_string(),
            progress: snapshot.progress.percent(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationComplete {
    pub translation_id: String,
    /// 毫秒时间戳
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub translation_id: Option<String>,
    pub message: String,
    pub code: String,
}

/// 连接层控制消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Connected {
        #[serde(rename = "clientId")]
        client_id: String,
        message: String,
    },
    Pong {
        timestamp: i64,
    },
}

/// 客户端发来的消息
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

/// 写往某个连接的出站消息
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Control(ControlMessage),
    Event(ServerEvent),
    /// 协议层 ping
    Ping,
    /// 关闭连接
    Close,
}

impl Outbound {
    /// 文本帧内容，协议层消息返回 `None`
    pub fn to_json(&self) -> Option<Result<String, serde_json::Error>> {
        match self {
            Outbound::Control(message) => Some(serde_json::to_string(message)),
            Outbound::Event(event) => Some(serde_json::to_string(event)),
            Outbound::Ping | Outbound::Close => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_format() {
        let event = ServerEvent::TranslationUpdate(TranslationUpdate {
            translation_id: "translation-1".to_string(),
            chunk_index: 1,
            total_chunks: 3,
            text: "<p>hi</p>".to_string(),
            progress: 66,
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "translation_update",
                "data": {
                    "translationId": "translation-1",
                    "chunkIndex": 1,
                    "totalChunks": 3,
                    "text": "<p>hi</p>",
                    "progress": 66
                }
            })
        );
    }

    #[test]
    fn test_error_event_omits_missing_id() {
        let event = ServerEvent::Error(ErrorEvent {
            translation_id: None,
            message: "boom".to_string(),
            code: "TRANSLATION_FAILED".to_string(),
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "error");
        assert!(value["data"].get("translationId").is_none());
        assert_eq!(event.kind(), "error");
    }

    #[test]
    fn test_control_messages_are_flat() {
        let connected = ControlMessage::Connected {
            client_id: "1700000000000-abcde".to_string(),
            message: "Connection established".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&connected).unwrap(),
            json!({
                "type": "connected",
                "clientId": "1700000000000-abcde",
                "message": "Connection established"
            })
        );

        let pong = serde_json::to_value(ControlMessage::Pong { timestamp: 42 }).unwrap();
        assert_eq!(pong, json!({"type": "pong", "timestamp": 42}));
    }

    #[test]
    fn test_client_ping_parses() {
        let message: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(message, ClientMessage::Ping);
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#).is_err());
    }
}
