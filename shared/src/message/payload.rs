use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Sync ====================

/// 同步信号载荷 - 资源变更通知
///
/// 服务端在订单等资源变更后广播，客户端收到后重新拉取列表
/// （失效-重取策略）。`data` 携带完整的变更行，便于未来做增量应用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型 (如 "order", "kit")
    pub resource: String,
    /// 单调递增的资源版本号
    pub version: u64,
    /// 变更类型 ("created", "updated", "deleted")
    pub action: String,
    /// 资源 ID
    pub id: String,
    /// 变更后的资源数据 (deleted 时为 None)
    pub data: Option<serde_json::Value>,
}

// ==================== Handshake ====================

/// 握手载荷 (客户端 -> 服务端)
///
/// 包含客户端的协议版本信息，用于服务端进行版本校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// 协议版本
    pub version: u16,
    /// 客户端名称/标识
    pub client_name: Option<String>,
}

// ==================== Notification ====================

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// 普通信息
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 通知载荷 (服务端 -> 客户端)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub level: NotificationLevel,
    pub message: String,
}
