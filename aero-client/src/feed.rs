//! Vendor order feed
//!
//! 拉取-分组管线：全量拉取订单，按尾号分组。同步信号只做失效标记，
//! 真实数据总是来自下一次全量重取 (invalidate-and-refetch)。

use shared::{BusMessage, Order, OrderStatus, TailGroup, group_by_tail};
use tokio_util::sync::CancellationToken;

use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::sync::SyncListener;

/// Resource name used in sync signals for orders
const ORDER_RESOURCE: &str = "order";

/// The vendor dashboard's view of all orders, grouped by tail number
pub struct OrderFeed {
    http: HttpClient,
    groups: Vec<TailGroup>,
    /// Highest sync version seen for the order resource
    last_version: u64,
}

impl OrderFeed {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            groups: Vec::new(),
            last_version: 0,
        }
    }

    /// Current groups, ordered by each group's earliest window start
    pub fn groups(&self) -> &[TailGroup] {
        &self.groups
    }

    /// Full fetch and regroup
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let orders = self.http.list_orders().await?;
        self.groups = group_by_tail(orders);
        Ok(())
    }

    /// Initial load (alias for refresh, kept for call-site readability)
    pub async fn load(&mut self) -> ClientResult<()> {
        self.refresh().await
    }

    /// Whether a bus message invalidates the current view
    ///
    /// 只关心 `order` 资源的同步信号；重复/乱序的旧版本信号被忽略。
    pub fn needs_refresh(&mut self, message: &BusMessage) -> bool {
        let Some(payload) = message.sync_payload() else {
            return false;
        };
        if payload.resource != ORDER_RESOURCE {
            return false;
        }
        if payload.version <= self.last_version {
            return false;
        }
        self.last_version = payload.version;
        true
    }

    /// Mark an order delivered
    ///
    /// No optimistic local update: the mutation response (or the sync signal
    /// it triggers) drives the next refresh, so a failed call leaves the
    /// view consistent.
    pub async fn mark_delivered(&self, id: &str) -> ClientResult<Order> {
        self.http.update_order_status(id, OrderStatus::Delivered).await
    }

    /// Drive the feed from a sync listener until cancelled
    ///
    /// Connection loss ends the loop; the caller decides whether to
    /// reconnect and re-run.
    pub async fn run(
        &mut self,
        listener: &mut SyncListener,
        cancel: CancellationToken,
    ) -> ClientResult<()> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                message = listener.next_message() => {
                    match message? {
                        Some(msg) => {
                            if self.needs_refresh(&msg) {
                                self.refresh().await?;
                            }
                        }
                        // Server closed the connection
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}
