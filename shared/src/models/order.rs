//! Order Model
//!
//! 订单在提交时作为购物车的不可变快照创建：
//! - 行项目按值拷贝并冻结 (`LineItem`)
//! - 创建后只有 `status` 字段可变
//! - 订单永不删除
//!
//! # 不变量
//!
//! - `subtotal_cents == total_cents == Σ line_total_cents` (当前无税费逻辑)
//! - `window_end == window_start + 1 小时` (固定配送时段)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 配送时段固定时长 (秒)
pub const DELIVERY_WINDOW_SECS: i64 = 3600;

/// 无尾号订单的分组桶
const UNKNOWN_TAIL: &str = "UNKNOWN";

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

/// Frozen order line, computed once at submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    /// Kit id the line was built from
    pub id: String,
    pub name: String,
    pub unit_cents: i64,
    pub qty: i64,
    /// `unit_cents * qty`, 提交时计算并冻结
    pub line_total_cents: i64,
}

impl LineItem {
    /// 从购物车条目冻结为订单行
    pub fn from_cart_item(item: &super::CartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            unit_cents: item.unit_cents,
            qty: item.qty,
            line_total_cents: item.unit_cents * item.qty,
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 服务端分配的 ID ("orders:xxx")
    pub id: Option<String>,
    pub status: OrderStatus,
    /// 飞机尾号 (大写)，缺失时进入 UNKNOWN 分组
    pub tail_number: Option<String>,
    /// FBO 显示名称 (MVP: 仅存标签)
    pub fbo_label: Option<String>,
    pub subtotal_cents: i64,
    pub total_cents: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// 冻结的行项目快照 (有序)
    pub items: Vec<LineItem>,
    /// 顺序发票号
    pub invoice_number: i64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Order creation payload (checkout submission)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub tail_number: Option<String>,
    pub fbo_label: Option<String>,
    pub subtotal_cents: i64,
    pub total_cents: i64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub items: Vec<LineItem>,
    pub invoice_number: i64,
}

impl OrderCreate {
    /// 校验创建不变量
    ///
    /// - 行项目非空，数量 >= 1，单价 >= 0
    /// - 每行 `line_total_cents == unit_cents * qty`
    /// - `subtotal_cents == total_cents == Σ line_total_cents`
    /// - `window_end == window_start + 1h`
    /// - `invoice_number >= 1`
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("order must contain at least one line item".into());
        }
        for item in &self.items {
            if item.qty < 1 {
                return Err(format!("line {}: qty must be >= 1", item.id));
            }
            if item.unit_cents < 0 {
                return Err(format!("line {}: unit_cents must be >= 0", item.id));
            }
            if item.line_total_cents != item.unit_cents * item.qty {
                return Err(format!("line {}: line_total_cents mismatch", item.id));
            }
        }
        let sum: i64 = self.items.iter().map(|i| i.line_total_cents).sum();
        if self.subtotal_cents != sum || self.total_cents != sum {
            return Err(format!(
                "totals mismatch: subtotal={} total={} lines={}",
                self.subtotal_cents, self.total_cents, sum
            ));
        }
        if self.window_end - self.window_start != Duration::seconds(DELIVERY_WINDOW_SECS) {
            return Err("delivery window must be exactly 1 hour".into());
        }
        if self.invoice_number < 1 {
            return Err("invoice_number must be >= 1".into());
        }
        Ok(())
    }
}

// =============================================================================
// Tail grouping (vendor dashboard)
// =============================================================================

/// Orders for a single aircraft, sorted by delivery window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailGroup {
    /// 大写尾号，或 "UNKNOWN"
    pub tail: String,
    /// 组内订单，按 `window_start` 升序
    pub orders: Vec<Order>,
    /// 组内最早的 `window_start`，用于组间排序
    pub next_start: DateTime<Utc>,
}

/// Group orders by case-normalized tail number
///
/// - 分组键为大写尾号；空白或缺失的尾号进入 "UNKNOWN" 桶
/// - 组内订单按 `window_start` 升序
/// - 组间按各组最早成员的 `window_start` 升序，最紧急的飞机排最前
pub fn group_by_tail(orders: Vec<Order>) -> Vec<TailGroup> {
    let mut buckets: Vec<(String, Vec<Order>)> = Vec::new();

    for order in orders {
        let key = match order.tail_number.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_uppercase(),
            _ => UNKNOWN_TAIL.to_string(),
        };
        match buckets.iter_mut().find(|(tail, _)| *tail == key) {
            Some((_, list)) => list.push(order),
            None => buckets.push((key, vec![order])),
        }
    }

    let mut groups: Vec<TailGroup> = buckets
        .into_iter()
        .map(|(tail, mut list)| {
            list.sort_by_key(|o| o.window_start);
            let next_start = list[0].window_start;
            TailGroup {
                tail,
                orders: list,
                next_start,
            }
        })
        .collect();

    groups.sort_by_key(|g| g.next_start);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartItem;

    fn order(tail: Option<&str>, start_offset_mins: i64) -> Order {
        let start = DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(start_offset_mins);
        Order {
            id: None,
            status: OrderStatus::Pending,
            tail_number: tail.map(String::from),
            fbo_label: None,
            subtotal_cents: 0,
            total_cents: 0,
            window_start: start,
            window_end: start + Duration::seconds(DELIVERY_WINDOW_SECS),
            items: vec![],
            invoice_number: 1,
            created_at: None,
        }
    }

    #[test]
    fn grouping_normalizes_case_and_buckets_missing_tails() {
        // tails [N1, n1, N2, None] at T+2, T+1, T+3, T+0
        let orders = vec![
            order(Some("N1"), 2),
            order(Some("n1"), 1),
            order(Some("N2"), 3),
            order(None, 0),
        ];

        let groups = group_by_tail(orders);

        let tails: Vec<&str> = groups.iter().map(|g| g.tail.as_str()).collect();
        assert_eq!(tails, vec!["UNKNOWN", "N1", "N2"]);

        let n1 = &groups[1];
        assert_eq!(n1.orders.len(), 2);
        // N1 组内按 window_start 升序: T+1 在 T+2 之前
        assert!(n1.orders[0].window_start < n1.orders[1].window_start);
        assert_eq!(n1.next_start, n1.orders[0].window_start);

        assert_eq!(groups[2].orders.len(), 1);
    }

    #[test]
    fn grouping_treats_blank_tail_as_unknown() {
        let groups = group_by_tail(vec![order(Some("  "), 0), order(Some("n77"), 1)]);
        assert_eq!(groups[0].tail, "UNKNOWN");
        assert_eq!(groups[1].tail, "N77");
    }

    #[test]
    fn grouping_empty_input_is_empty() {
        assert!(group_by_tail(vec![]).is_empty());
    }

    #[test]
    fn line_item_freezes_cart_snapshot() {
        let item = CartItem {
            id: "kit:espresso".into(),
            name: "Espresso Kit".into(),
            unit_cents: 15000,
            qty: 2,
        };
        let line = LineItem::from_cart_item(&item);
        assert_eq!(line.line_total_cents, 30000);
    }

    #[test]
    fn order_create_invariants() {
        let start = Utc::now();
        let mut create = OrderCreate {
            tail_number: Some("N123AB".into()),
            fbo_label: Some("PBI · Signature Flight Support".into()),
            subtotal_cents: 50000,
            total_cents: 50000,
            window_start: start,
            window_end: start + Duration::seconds(DELIVERY_WINDOW_SECS),
            items: vec![
                LineItem {
                    id: "kit:a".into(),
                    name: "A".into(),
                    unit_cents: 20000,
                    qty: 1,
                    line_total_cents: 20000,
                },
                LineItem {
                    id: "kit:b".into(),
                    name: "B".into(),
                    unit_cents: 15000,
                    qty: 2,
                    line_total_cents: 30000,
                },
            ],
            invoice_number: 42,
        };
        assert!(create.check_invariants().is_ok());

        // 总额不一致
        create.total_cents = 49999;
        assert!(create.check_invariants().is_err());
        create.total_cents = 50000;

        // 时段不是 1 小时
        create.window_end = start + Duration::seconds(DELIVERY_WINDOW_SECS + 1);
        assert!(create.check_invariants().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"delivered\""
        );
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
    }
}
