//! Cart Item Model
//!
//! 购物车条目。唯一键为 `id`，数量下限为 1。

use serde::{Deserialize, Serialize};

/// A single line in the shopper's cart
///
/// Owned exclusively by the client-side cart store. The quantity floor (1)
/// is enforced by the store's mutation operations, not by this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    /// Kit id this line refers to
    pub id: String,
    pub name: String,
    /// 单价 (分)
    pub unit_cents: i64,
    /// 数量 (>= 1)
    pub qty: i64,
}

impl CartItem {
    /// 当前行小计 (分)
    pub fn line_cents(&self) -> i64 {
        self.unit_cents * self.qty
    }
}
