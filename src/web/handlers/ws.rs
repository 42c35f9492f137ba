//! 推送通道 WebSocket 处理器
//!
//! 每个连接拆成写任务和读循环：写任务消费通知器里该连接的队列，
//! 读循环处理 pong、应用层 ping 和关闭。任一方结束时连接被注销。

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::realtime::{ClientMessage, ControlMessage, Notifier, Outbound};
use crate::web::types::AppState;

/// 升级为 WebSocket 连接
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Arc::clone(&state.notifier)))
}

async fn handle_socket(socket: WebSocket, notifier: Arc<Notifier>) {
    let (client_id, outbound) = notifier.register();
    let (sink, stream) = socket.split();

    let mut writer = tokio::spawn(write_outbound(sink, outbound));
    let reader = read_inbound(stream, &notifier, &client_id);

    tokio::select! {
        _ = &mut writer => {}
        _ = reader => writer.abort(),
    }

    notifier.deregister(&client_id);
}

async fn write_outbound(
    mut sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Outbound>,
) {
    while let Some(message) = outbound.recv().await {
        let frame = match message {
            Outbound::Ping => Message::Ping(Vec::new()),
            Outbound::Close => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            other => match other.to_json() {
                Some(Ok(text)) => Message::Text(text),
                Some(Err(e)) => {
                    tracing::error!("推送消息序列化失败: {}", e);
                    continue;
                }
                None => continue,
            },
        };

        if let Err(e) = sink.send(frame).await {
            tracing::debug!("推送连接写入失败: {}", e);
            break;
        }
    }
}

async fn read_inbound(
    mut stream: futures::stream::SplitStream<WebSocket>,
    notifier: &Notifier,
    client_id: &str,
) {
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("客户端 {} 连接错误: {}", client_id, e);
                break;
            }
        };

        match frame {
            Message::Pong(_) => notifier.mark_alive(client_id),
            Message::Text(text) => handle_text(notifier, client_id, &text),
            Message::Close(_) => break,
            Message::Ping(_) | Message::Binary(_) => {}
        }
    }
}

fn handle_text(notifier: &Notifier, client_id: &str, text: &str) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("客户端 {} 发来无法解析的消息: {}", client_id, e);
            return;
        }
    };

    match serde_json::from_value::<ClientMessage>(value) {
        Ok(ClientMessage::Ping) => {
            let pong = ControlMessage::Pong {
                timestamp: chrono::Utc::now().timestamp_millis(),
            };
            notifier.send_control(client_id, pong);
        }
        Err(_) => tracing::debug!("忽略客户端 {} 的未知消息", client_id),
    }
}
