//! 推送通道客户端注册表
//!
//! 每个连接对应一个有界队列，由连接自己的写任务消费。投递是尽力而为的：
//! 客户端不存在、队列已满或已关闭时直接丢弃事件，轮询接口是兜底。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::events::{ControlMessage, Outbound, ServerEvent};
use crate::translation::config::constants::CLIENT_QUEUE_CAPACITY;

struct ClientHandle {
    sender: mpsc::Sender<Outbound>,
    /// 上一次 ping 之后是否收到过 pong
    alive: Arc<AtomicBool>,
}

/// 推送通知器
pub struct Notifier {
    clients: DashMap<String, ClientHandle>,
    queue_capacity: usize,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_capacity(CLIENT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            clients: DashMap::new(),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// 注册新连接，连接确认消息已经排在队列最前面
    pub fn register(&self) -> (String, mpsc::Receiver<Outbound>) {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);

        let client_id = loop {
            let candidate = generate_client_id();
            if let Entry::Vacant(slot) = self.clients.entry(candidate.clone()) {
                slot.insert(ClientHandle {
                    sender: sender.clone(),
                    alive: Arc::new(AtomicBool::new(true)),
                });
                break candidate;
            }
        };

        let ack = Outbound::Control(ControlMessage::Connected {
            client_id: client_id.clone(),
            message: "Connection established".to_string(),
        });
        if sender.try_send(ack).is_err() {
            tracing::warn!("客户端 {} 的连接确认未能入队", client_id);
        }

        tracing::info!("推送客户端已连接: {} (当前 {} 个)", client_id, self.clients.len());
        (client_id, receiver)
    }

    /// 收到 pong
    pub fn mark_alive(&self, client_id: &str) {
        if let Some(client) = self.clients.get(client_id) {
            client.alive.store(true, Ordering::Relaxed);
        }
    }

    /// 注销连接，重复调用是安全的
    pub fn deregister(&self, client_id: &str) -> bool {
        let removed = self.clients.remove(client_id).is_some();
        if removed {
            tracing::info!("推送客户端已断开: {}", client_id);
        }
        removed
    }

    pub fn is_connected(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// 向指定客户端推送事件，返回是否入队成功
    pub fn send(&self, client_id: &str, event: ServerEvent) -> bool {
        let Some(sender) = self.clients.get(client_id).map(|c| c.sender.clone()) else {
            tracing::debug!("客户端 {} 未连接，丢弃 {} 事件", client_id, event.kind());
            return false;
        };

        let kind = event.kind();
        match sender.try_send(Outbound::Event(event)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("客户端 {} 队列已满，丢弃 {} 事件", client_id, kind);
                metrics::counter!("parallel_reader_push_events_dropped_total").increment(1);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!("客户端 {} 发送失败，连接已关闭", client_id);
                metrics::counter!("parallel_reader_push_events_dropped_total").increment(1);
                self.deregister(client_id);
                false
            }
        }
    }

    /// 向指定客户端发送控制消息（例如应用层 pong）
    pub fn send_control(&self, client_id: &str, message: ControlMessage) -> bool {
        match self.clients.get(client_id) {
            Some(client) => client.sender.try_send(Outbound::Control(message)).is_ok(),
            None => false,
        }
    }

    /// 一次心跳：上次 ping 后没有回应的连接被终止，其余连接收到新的 ping。
    /// 返回被终止的连接数。
    pub fn heartbeat_tick(&self) -> usize {
        let mut dead = Vec::new();

        for entry in self.clients.iter() {
            let client = entry.value();
            let outbound = if client.alive.swap(false, Ordering::Relaxed) {
                Outbound::Ping
            } else {
                dead.push(entry.key().clone());
                Outbound::Close
            };

            if let Err(TrySendError::Closed(_)) = client.sender.try_send(outbound) {
                dead.push(entry.key().clone());
            }
        }

        dead.sort();
        dead.dedup();
        for client_id in &dead {
            tracing::warn!("客户端 {} 心跳超时，终止连接", client_id);
            self.deregister(client_id);
        }
        dead.len()
    }

    /// 启动周期性心跳
    pub fn spawn_heartbeat(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let terminated = notifier.heartbeat_tick();
                if terminated > 0 {
                    tracing::info!("心跳检查终止了 {} 个连接", terminated);
                }
            }
        })
    }
}

fn generate_client_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), &suffix[..5])
}
