//! Kit Model
//!
//! 目录中的可购买套装。客户端只读，服务端按 `active = true` 过滤。

use serde::{Deserialize, Serialize};

/// Catalog kit entity
///
/// 金额统一使用整数分 (cents)，避免浮点误差。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Kit {
    /// 服务端分配的 ID ("kit:xxx")
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// 单价 (分)
    pub price_cents: i64,
    /// 是否上架
    pub active: bool,
}

/// Kit creation payload (vendor seeding / admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitCreate {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// 默认上架
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
