//! 同步总线消息类型定义
//!
//! 这些类型在 vendor-server 和客户端之间共享，用于
//! 进程内（内存）和网络（TCP）通信。
//!
//! # 线上格式
//!
//! TCP 传输使用长度前缀帧：`u32` 大端长度 + BusMessage 的 JSON 序列化。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 协议版本号
pub const PROTOCOL_VERSION: u16 = 1;

/// 帧长度上限 (1 MiB)，防御异常输入
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

/// 总线事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 握手消息
    Handshake = 0,
    /// 系统通知
    Notification = 1,
    /// 同步信号 (资源变更)
    Sync = 2,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
        }
    }
}

/// 总线消息 - 只包含业务必需字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    /// 发送方标识 (服务端广播时为 None)
    pub source: Option<String>,
    /// 业务载荷 (JSON 字节)
    pub payload: Vec<u8>,
}

impl BusMessage {
    /// 创建新消息
    ///
    /// 载荷序列化失败返回错误，不会产生空载荷消息。
    pub fn new<T: Serialize>(event_type: EventType, data: &T) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(data)?;
        Ok(Self {
            request_id: Uuid::new_v4(),
            event_type,
            source: None,
            payload,
        })
    }

    /// 创建同步信号消息
    pub fn sync(payload: &SyncPayload) -> Result<Self, serde_json::Error> {
        Self::new(EventType::Sync, payload)
    }

    /// 创建握手消息
    pub fn handshake(payload: &HandshakePayload) -> Result<Self, serde_json::Error> {
        Self::new(EventType::Handshake, payload)
    }

    /// 创建通知消息
    pub fn notification(payload: &NotificationPayload) -> Result<Self, serde_json::Error> {
        Self::new(EventType::Notification, payload)
    }

    /// 反序列化业务载荷
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// 若为同步信号，解析 SyncPayload
    pub fn sync_payload(&self) -> Option<SyncPayload> {
        if self.event_type != EventType::Sync {
            return None;
        }
        self.payload_as().ok()
    }

    // ========== 帧编解码 ==========

    /// 编码为长度前缀帧 (u32 BE + JSON)
    pub fn to_frame(&self) -> Result<Vec<u8>, serde_json::Error> {
        let body = serde_json::to_vec(self)?;
        let mut frame = Vec::with_capacity(4 + body.len());
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// 从帧体 (不含长度前缀) 解码
    pub fn from_frame_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
