//! Checkout flow
//!
//! 结账表单 + 提交流程。提交是单次写入，无重试、无幂等键：响应丢失后用户
//! 可能重复提交 (已知缺口)。发票号两段式分配见 [`HttpClient::next_invoice_number`]。

use chrono::{DateTime, Duration, Utc};
use shared::{CartItem, LineItem, Order, OrderCreate, DELIVERY_WINDOW_SECS};

use crate::cart::CartStore;
use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use crate::storage::LocalStore;

/// A fulfillment location the shopper can pick at checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fbo {
    pub id: &'static str,
    pub label: &'static str,
    pub airport_iata: &'static str,
}

/// Built-in FBO list (MVP: hard-coded, orders store the label only)
pub fn default_fbos() -> Vec<Fbo> {
    vec![
        Fbo {
            id: "pbi_sig",
            label: "PBI · Signature Flight Support",
            airport_iata: "PBI",
        },
        Fbo {
            id: "sua_atl",
            label: "SUA · Atlantic Aviation",
            airport_iata: "SUA",
        },
        Fbo {
            id: "fll_shl",
            label: "FLL · Sheltair Aviation",
            airport_iata: "FLL",
        },
    ]
}

/// What the shopper has filled in so far
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub fbo: Option<Fbo>,
    pub tail_number: String,
    /// Delivery window start; the window end is always start + 1h
    pub window_start: Option<DateTime<Utc>>,
}

impl CheckoutForm {
    /// Whether the submit action should be enabled
    ///
    /// 非空购物车 + 已选 FBO + 非空尾号 + 可解析的时间。
    pub fn can_submit(&self, cart: &CartStore) -> bool {
        !cart.is_empty()
            && self.fbo.is_some()
            && !self.tail_number.trim().is_empty()
            && self.window_start.is_some()
    }

    /// Build the order payload from the current cart contents
    ///
    /// Line items are frozen copies with computed line totals; the cart is
    /// not consumed here, only snapshotted.
    pub fn build_order(
        &self,
        items: &[CartItem],
        invoice_number: i64,
    ) -> ClientResult<OrderCreate> {
        let fbo = self
            .fbo
            .as_ref()
            .ok_or_else(|| ClientError::Precondition("no FBO selected".into()))?;
        let window_start = self
            .window_start
            .ok_or_else(|| ClientError::Precondition("no delivery time selected".into()))?;

        let tail = self.tail_number.trim().to_uppercase();
        if tail.is_empty() {
            return Err(ClientError::Precondition("tail number is blank".into()));
        }
        if items.is_empty() {
            return Err(ClientError::Precondition("cart is empty".into()));
        }

        let line_items: Vec<LineItem> = items.iter().map(LineItem::from_cart_item).collect();
        let total_cents: i64 = line_items.iter().map(|l| l.line_total_cents).sum();

        Ok(OrderCreate {
            tail_number: Some(tail),
            fbo_label: Some(fbo.label.to_string()),
            subtotal_cents: total_cents,
            total_cents,
            window_start,
            window_end: window_start + Duration::seconds(DELIVERY_WINDOW_SECS),
            items: line_items,
            invoice_number,
        })
    }
}

/// Submit the cart as an order
///
/// Fetches the next invoice number, posts the order, and on success clears
/// the cart and remembers the tail number. On failure the cart is left
/// untouched and the error is returned.
pub async fn submit_order(
    http: &HttpClient,
    cart: &mut CartStore,
    form: &CheckoutForm,
    store: Option<&LocalStore>,
) -> ClientResult<Order> {
    if !form.can_submit(cart) {
        return Err(ClientError::Precondition(
            "add items, pick an FBO, enter tail, and choose date/time".into(),
        ));
    }

    let invoice_number = http.next_invoice_number().await?;
    let payload = form.build_order(cart.items(), invoice_number)?;
    let order = http.create_order(&payload).await?;

    cart.clear();
    if let Some(store) = store {
        // 尾号记忆是尽力而为，失败不影响已成功的订单
        if let Some(tail) = &payload.tail_number {
            if let Err(err) = store.set_remembered_tail(tail) {
                tracing::warn!("failed to remember tail number: {}", err);
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            fbo: default_fbos().into_iter().next(),
            tail_number: " n123ab ".to_string(),
            window_start: Some(Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap()),
        }
    }

    fn loaded_cart() -> CartStore {
        let mut cart = CartStore::new();
        cart.add("kit_a", "Kit A", 20000, 1);
        cart.add("kit_b", "Kit B", 15000, 2);
        cart
    }

    #[test]
    fn can_submit_requires_all_fields() {
        let cart = loaded_cart();
        let form = filled_form();
        assert!(form.can_submit(&cart));

        assert!(!filled_form().can_submit(&CartStore::new()));

        let mut no_fbo = filled_form();
        no_fbo.fbo = None;
        assert!(!no_fbo.can_submit(&cart));

        let mut blank_tail = filled_form();
        blank_tail.tail_number = "   ".to_string();
        assert!(!blank_tail.can_submit(&cart));

        let mut no_time = filled_form();
        no_time.window_start = None;
        assert!(!no_time.can_submit(&cart));
    }

    #[test]
    fn build_order_freezes_lines_and_totals() {
        let cart = loaded_cart();
        let form = filled_form();

        let payload = form.build_order(cart.items(), 42).unwrap();

        assert_eq!(payload.subtotal_cents, 50000);
        assert_eq!(payload.total_cents, 50000);
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].line_total_cents, 20000);
        assert_eq!(payload.items[1].line_total_cents, 30000);
        assert_eq!(payload.invoice_number, 42);
        assert_eq!(
            (payload.window_end - payload.window_start).num_seconds(),
            3600
        );
        // payload passes the server-side invariant check as-is
        payload.check_invariants().unwrap();
    }

    #[test]
    fn build_order_normalizes_tail_number() {
        let cart = loaded_cart();
        let form = filled_form();

        let payload = form.build_order(cart.items(), 1).unwrap();
        assert_eq!(payload.tail_number.as_deref(), Some("N123AB"));
        assert_eq!(
            payload.fbo_label.as_deref(),
            Some("PBI · Signature Flight Support")
        );
    }

    #[test]
    fn default_fbos_cover_three_airports() {
        let fbos = default_fbos();
        let iatas: Vec<&str> = fbos.iter().map(|f| f.airport_iata).collect();
        assert_eq!(iatas, vec!["PBI", "SUA", "FLL"]);
    }
}
