//! Client configuration

use crate::error::{ClientError, ClientResult};

/// Client configuration for connecting to the vendor server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:4000")
    pub base_url: String,

    /// Sync bus TCP address (e.g., "localhost:4081"),
    /// None disables realtime refresh
    pub sync_tcp_addr: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// 支付服务可发布密钥 (仅配置面；无扣款流程)
    pub payment_publishable_key: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sync_tcp_addr: None,
            timeout: 30,
            payment_publishable_key: None,
        }
    }

    /// 从环境变量加载配置 (严格变体)
    ///
    /// | 环境变量 | 必需 | 说明 |
    /// |----------|------|------|
    /// | AEROKITS_SERVER_URL | 是 | 服务端地址 |
    /// | AEROKITS_SYNC_ADDR | 否 | 同步总线 TCP 地址 |
    /// | AEROKITS_PUBLISHABLE_KEY | 否 | 支付可发布密钥 |
    ///
    /// 缺少服务端地址返回 [`ClientError::Config`]。
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("AEROKITS_SERVER_URL")
            .map_err(|_| ClientError::Config("AEROKITS_SERVER_URL is not set".into()))?;

        Ok(Self {
            base_url,
            sync_tcp_addr: std::env::var("AEROKITS_SYNC_ADDR").ok(),
            timeout: 30,
            payment_publishable_key: std::env::var("AEROKITS_PUBLISHABLE_KEY").ok(),
        })
    }

    /// Set the sync bus TCP address
    pub fn with_sync_tcp_addr(mut self, addr: impl Into<String>) -> Self {
        self.sync_tcp_addr = Some(addr.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}
