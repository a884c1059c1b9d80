//! Client-side cart store
//!
//! 购物车状态机。单一持有者 (UI 线程) 直接调用同步变更方法，无内部锁。
//! 变更通过 `tokio::sync::watch` 通道广播快照，持久化为尽力而为 (best-effort):
//! 写入 redb 失败只记录警告，内存状态仍然权威。

use shared::{CartItem, Kit};
use tokio::sync::watch;

use crate::storage::{LocalStore, StorageResult};

/// Persistence seam for the cart
///
/// 生产实现是 [`LocalStore`]。
pub trait CartBackend: Send + Sync {
    fn load(&self) -> StorageResult<Vec<CartItem>>;
    fn save(&self, items: &[CartItem]) -> StorageResult<()>;
}

impl CartBackend for LocalStore {
    fn load(&self) -> StorageResult<Vec<CartItem>> {
        self.load_cart()
    }

    fn save(&self, items: &[CartItem]) -> StorageResult<()> {
        self.save_cart(items)
    }
}

/// Immutable view of the cart published to observers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total_cents: i64,
    pub item_count: i64,
}

/// The shopper's cart
///
/// Owns the item list exclusively. Every mutation persists the whole cart
/// and publishes a fresh [`CartSnapshot`] on the watch channel.
pub struct CartStore {
    items: Vec<CartItem>,
    store: Option<Box<dyn CartBackend>>,
    tx: watch::Sender<CartSnapshot>,
}

impl CartStore {
    /// Create a cart without persistence (tests, ephemeral sessions)
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CartSnapshot::default());
        Self {
            items: Vec::new(),
            store: None,
            tx,
        }
    }

    /// Create a cart backed by a local store, restoring any persisted lines
    pub fn with_store(store: LocalStore) -> Self {
        Self::with_backend(Box::new(store))
    }

    /// Create a cart over an arbitrary persistence backend
    pub fn with_backend(store: Box<dyn CartBackend>) -> Self {
        let items = match store.load() {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!("failed to restore persisted cart: {}", err);
                Vec::new()
            }
        };

        let (tx, _) = watch::channel(CartSnapshot::default());
        let mut cart = Self {
            items,
            store: Some(store),
            tx,
        };
        cart.notify();
        cart
    }

    /// Subscribe to cart changes
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total_cents: self.total_cents(),
            item_count: self.item_count(),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ========== Mutations ==========

    /// Add a kit line; merges by id when it already exists
    pub fn add(&mut self, id: &str, name: &str, unit_cents: i64, qty: i64) {
        if qty < 1 {
            return;
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == id) {
            existing.qty += qty;
        } else {
            self.items.push(CartItem {
                id: id.to_string(),
                name: name.to_string(),
                unit_cents,
                qty,
            });
        }
        self.persist_and_notify();
    }

    /// Add one unit of a catalog kit
    pub fn add_kit(&mut self, kit: &Kit) {
        let Some(id) = kit.id.as_deref() else {
            tracing::warn!("ignoring cart add for kit without id: {}", kit.name);
            return;
        };
        self.add(id, &kit.name, kit.price_cents, 1);
    }

    /// Increase a line's quantity by one; unknown id is a no-op
    pub fn increment(&mut self, id: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.qty += 1;
            self.persist_and_notify();
        }
    }

    /// Decrease a line's quantity by one, flooring at 1
    ///
    /// 数量到 1 后再减是空操作，删除行必须用显式 `remove`。
    pub fn decrement(&mut self, id: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            if item.qty > 1 {
                item.qty -= 1;
                self.persist_and_notify();
            }
        }
    }

    /// Delete a line regardless of quantity
    pub fn remove(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() != before {
            self.persist_and_notify();
        }
    }

    /// Empty the cart (after a successful order submission)
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.persist_and_notify();
        }
    }

    // ========== Derived values ==========

    /// Σ qty × unit_cents over all lines
    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(CartItem::line_cents).sum()
    }

    /// Σ qty over all lines
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.qty).sum()
    }

    // ========== Internal ==========

    fn persist_and_notify(&mut self) {
        if let Some(store) = &self.store {
            // Best-effort durability; in-memory state stays authoritative
            if let Err(err) = store.save(&self.items) {
                tracing::warn!("failed to persist cart: {}", err);
            }
        }
        self.notify();
    }

    fn notify(&mut self) {
        // send_replace never fails even with zero receivers
        self.tx.send_replace(self.snapshot());
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_with(lines: &[(&str, i64, i64)]) -> CartStore {
        let mut cart = CartStore::new();
        for (id, unit_cents, qty) in lines {
            cart.add(id, &format!("Kit {id}"), *unit_cents, *qty);
        }
        cart
    }

    #[test]
    fn add_merges_by_id() {
        let mut cart = CartStore::new();
        cart.add("kit_a", "Kit A", 20000, 1);
        cart.add("kit_a", "Kit A", 20000, 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].qty, 3);
    }

    #[test]
    fn add_rejects_non_positive_qty() {
        let mut cart = CartStore::new();
        cart.add("kit_a", "Kit A", 20000, 0);
        cart.add("kit_a", "Kit A", 20000, -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn decrement_floors_at_one() {
        let mut cart = cart_with(&[("kit_a", 20000, 1)]);
        cart.decrement("kit_a");

        // still present with qty 1, not auto-removed
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].qty, 1);
    }

    #[test]
    fn increment_and_decrement_adjust_by_one() {
        let mut cart = cart_with(&[("kit_a", 20000, 2)]);
        cart.increment("kit_a");
        assert_eq!(cart.items()[0].qty, 3);
        cart.decrement("kit_a");
        assert_eq!(cart.items()[0].qty, 2);
    }

    #[test]
    fn remove_deletes_regardless_of_qty() {
        let mut cart = cart_with(&[("kit_a", 20000, 5), ("kit_b", 15000, 1)]);
        cart.remove("kit_a");

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id, "kit_b");
    }

    #[test]
    fn totals_sum_all_lines() {
        let cart = cart_with(&[("kit_a", 20000, 1), ("kit_b", 15000, 2)]);
        assert_eq!(cart.total_cents(), 50000);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = cart_with(&[("kit_a", 20000, 1)]);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), 0);
    }

    #[test]
    fn watch_publishes_snapshots() {
        let mut cart = CartStore::new();
        let rx = cart.subscribe();

        cart.add("kit_a", "Kit A", 20000, 2);

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.total_cents, 40000);
        assert_eq!(snapshot.item_count, 2);
        assert_eq!(snapshot.items.len(), 1);
    }

    #[test]
    fn failed_persistence_keeps_memory_authoritative() {
        use crate::storage::StorageError;

        struct FailingBackend;

        impl CartBackend for FailingBackend {
            fn load(&self) -> StorageResult<Vec<CartItem>> {
                Ok(Vec::new())
            }

            fn save(&self, _items: &[CartItem]) -> StorageResult<()> {
                Err(StorageError::Serialization(
                    serde_json::from_str::<serde_json::Value>("").unwrap_err(),
                ))
            }
        }

        // 每次写盘都失败：内存状态和快照通知不受影响
        let mut cart = CartStore::with_backend(Box::new(FailingBackend));
        let rx = cart.subscribe();

        cart.add("kit_a", "Arrival Kit", 20000, 2);
        cart.add("kit_b", "Snack Box", 15000, 1);
        assert_eq!(cart.total_cents(), 55000);

        cart.decrement("kit_a");
        assert_eq!(cart.total_cents(), 35000);
        assert_eq!(cart.item_count(), 2);

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.total_cents, 35000);

        cart.remove("kit_b");
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn restores_persisted_cart() {
        let store = LocalStore::in_memory().unwrap();
        {
            let mut cart = CartStore::with_store(store.clone());
            cart.add("kit_a", "Kit A", 20000, 2);
        }

        let reopened = CartStore::with_store(store);
        assert_eq!(reopened.items().len(), 1);
        assert_eq!(reopened.total_cents(), 40000);
    }
}
